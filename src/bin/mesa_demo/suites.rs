//! Scenarios bundled with the demo binary.

use thiserror::Error;

use mesa::{Ctx, FunctionCase, FunctionHarness, MethodCase, MethodHarness};

// =============================================================================
// BUFFER
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Msg {
    pub name: String,
    pub value: i64,
}

impl Msg {
    pub fn new(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    #[error("buffer is full")]
    Full,
}

/// A bounded message buffer.
#[derive(Debug, Default)]
pub struct Buffer {
    limit: usize,
    msgs: Vec<Msg>,
}

impl Buffer {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            msgs: Vec::new(),
        }
    }

    pub fn add(&mut self, msg: Msg) -> Result<(), BufferError> {
        if self.msgs.len() >= self.limit {
            return Err(BufferError::Full);
        }
        self.msgs.push(msg);
        Ok(())
    }

    pub fn msgs(&self) -> &[Msg] {
        &self.msgs
    }

    pub fn clear(&mut self) {
        self.msgs.clear();
    }
}

type BufferHarness = MethodHarness<Buffer, usize, Msg, Result<(), BufferError>>;
type BufferCase = MethodCase<Buffer, usize, Msg, Result<(), BufferError>>;

fn fill(ctx: &mut Ctx, buffer: &mut Buffer, _: &Msg) {
    for i in 0..buffer.limit {
        ctx.require.no_error(&buffer.add(Msg::new("filler", i as i64)));
    }
}

pub fn buffer_suite(with_failure: bool) -> BufferHarness {
    let harness = MethodHarness::new()
        .new_instance(|_, limit| Buffer::new(limit))
        .target(|_, buffer: &mut Buffer, msg: &Msg| buffer.add(msg.clone()))
        .case(
            BufferCase::new("adds message")
                .fields(10)
                .input(Msg::new("x", 1))
                .check(|ctx, buffer, input, out| {
                    if ctx.assert.no_error(out) && ctx.assert.len(buffer.msgs(), 1) {
                        ctx.assert.equal(input, &buffer.msgs()[0]);
                    }
                }),
        )
        .case(
            BufferCase::new("rejects when full")
                .fields(10)
                .input(Msg::new("x", 1))
                .before_call(fill)
                .check(|ctx, _, _, out| {
                    ctx.assert.error_is(out, &BufferError::Full);
                }),
        )
        .case(
            BufferCase::new("zero limit")
                .fields_fn(|_| 0)
                .input_fn(|_, _| Msg::new("computed", 7))
                .check(|ctx, _, _, out| {
                    ctx.assert.error(out);
                }),
        )
        .case(BufferCase::new("unbounded buffer").skip("not supported yet"));

    if with_failure {
        harness.case(
            BufferCase::new("expects wrong count")
                .fields(2)
                .input(Msg::new("x", 1))
                .check(|ctx, buffer, _, _| {
                    ctx.assert.len(buffer.msgs(), 2);
                }),
        )
    } else {
        harness
    }
}

pub fn buffer_benchmarks() -> BufferHarness {
    MethodHarness::new()
        .new_instance(|_, limit| Buffer::new(limit))
        .target(|ctx, buffer: &mut Buffer, msg: &Msg| {
            if buffer.msgs().len() == buffer.limit {
                buffer.clear();
            }
            ctx.report_metric(1.0, "msgs/op");
            buffer.add(msg.clone())
        })
        .check(|ctx, _, _, out| {
            ctx.require.no_error(out);
        })
        .case(BufferCase::new("small").fields(16).input(Msg::new("x", 1)))
        .case(BufferCase::new("large").fields(4096).input(Msg::new("x", 1)))
}

// =============================================================================
// ADDER
// =============================================================================

pub fn adder_suite() -> FunctionHarness<(i64, i64), i64> {
    FunctionHarness::new()
        .target(|_, (a, b): &(i64, i64)| a + b)
        .case(
            FunctionCase::new("one plus two")
                .input((1, 2))
                .check(|ctx, _, out| {
                    ctx.assert.equal(3, *out);
                }),
        )
        .case(
            FunctionCase::new("zeros")
                .input((0, 0))
                .check(|ctx, _, out| {
                    ctx.assert.equal(0, *out);
                }),
        )
}

pub fn sum_benchmarks() -> FunctionHarness<Vec<i64>, i64> {
    FunctionHarness::new()
        .target(|_, values: &Vec<i64>| values.iter().sum())
        .case(FunctionCase::new("hundred").input_fn(|_| (0..100).collect()))
        .case(FunctionCase::new("thousand").input_fn(|_| (0..1000).collect()))
}
