//! Mesa: table-driven tests and benchmarks for methods and functions.
//!
//! Describe the operation under test once, list the cases, and let the harness
//! build, call, check and clean up every case the same way.
//!
//! ```rust,ignore
//! use mesa::{FunctionCase, FunctionHarness, HostConfig};
//!
//! let harness = FunctionHarness::new()
//!     .target(|_, (a, b): &(i32, i32)| a + b)
//!     .check(|ctx, _, out| {
//!         ctx.assert.is_true(*out >= 0, "sum is non-negative");
//!     })
//!     .case(FunctionCase::new("one plus two").input((1, 2)))
//!     .case(FunctionCase::new("zeros").input((0, 0)));
//!
//! mesa::run_tests("adder", &HostConfig::default(), |t| harness.run(t)).assert_passed();
//! ```

pub use crate::assert::Assertions;
pub use crate::case::{
    BatchFn, BeforeCallFn, CheckFn, CleanupFn, FieldsFn, FunctionBeforeCallFn,
    FunctionBenchmarkCase, FunctionCase, FunctionCheckFn, FunctionCleanupFn, FunctionInputFn,
    FunctionTargetFn, InputFn, MethodBenchmarkCase, MethodCase, NewInstanceFn, TargetFn,
};
pub use crate::config::{BenchTime, HostConfig};
pub use crate::context::{Ctx, Handle};
pub use crate::errors::{MesaError, MesaResult};
pub use crate::harness::{
    FunctionBenchmarkHarness, FunctionHarness, MethodBenchmarkHarness, MethodHarness,
};
pub use crate::helpers::{must_assert, try_cast, try_cast_boxed};
pub use crate::host::{run_benchmarks, run_tests, Common, TestingT, B, T};
pub use crate::report::{BenchResult, Outcome, Record, Report, Summary};
pub use crate::resolve::{resolve, HookSource, Resolved};

pub mod assert;
pub mod case;
pub mod config;
pub mod context;
pub mod errors;
pub mod harness;
pub mod helpers;
pub mod host;
pub mod report;
pub mod resolve;

mod adapter;
mod runner;

/// Anything that runs as a batch of sub-tests.
pub trait Suite {
    fn run(&self, t: &T);
}

/// Anything that runs as a batch of sub-benchmarks.
pub trait BenchSuite {
    fn bench(&self, b: &B);
}

/// Runs each suite against `t`, in order.
pub fn run(t: &T, suites: &[&dyn Suite]) {
    for suite in suites {
        suite.run(t);
    }
}

/// Runs each benchmark suite against `b`, in order.
pub fn bench(b: &B, suites: &[&dyn BenchSuite]) {
    for suite in suites {
        suite.bench(b);
    }
}
