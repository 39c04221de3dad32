//! Harness configuration.
//!
//! [`MethodHarness`] describes a method under test: how to build the instance,
//! the target to call, the case table and the default hooks used when a case
//! does not override them. [`FunctionHarness`] is the same for a free
//! function and is executed by translating it into a `MethodHarness`.
//!
//! Both shapes run in correctness mode (`run(&T)`) and benchmark mode
//! (`bench(&B)`).

use std::rc::Rc;

use crate::adapter;
use crate::case::{
    BatchFn, BeforeCallFn, CheckFn, CleanupFn, FunctionBeforeCallFn, FunctionCase,
    FunctionCheckFn, FunctionCleanupFn, FunctionTargetFn, MethodCase, NewInstanceFn, TargetFn,
};
use crate::context::Ctx;
use crate::errors::{MesaError, MesaResult};
use crate::host::{B, T};
use crate::runner;
use crate::{BenchSuite, Suite};

// =============================================================================
// METHOD HARNESS
// =============================================================================

/// Table-driven harness for a method on `Inst`, built from fields `F`, called
/// with input `I` and returning `O`.
pub struct MethodHarness<Inst, F, I, O> {
    pub(crate) init: Option<BatchFn>,
    pub(crate) new_instance: Option<NewInstanceFn<Inst, F>>,
    pub(crate) target: Option<TargetFn<Inst, I, O>>,
    pub(crate) cases: Vec<MethodCase<Inst, F, I, O>>,
    pub(crate) before_call: Option<BeforeCallFn<Inst, I>>,
    pub(crate) check: Option<CheckFn<Inst, I, O>>,
    pub(crate) cleanup: Option<CleanupFn<Inst>>,
    pub(crate) teardown: Option<BatchFn>,
}

/// Benchmarks are configured exactly like correctness harnesses.
pub type MethodBenchmarkHarness<Inst, F, I, O> = MethodHarness<Inst, F, I, O>;

/// The callbacks a harness cannot run without.
pub(crate) struct Required<Inst, F, I, O> {
    pub new_instance: NewInstanceFn<Inst, F>,
    pub target: TargetFn<Inst, I, O>,
}

impl<Inst, F, I, O> Default for MethodHarness<Inst, F, I, O> {
    fn default() -> Self {
        Self {
            init: None,
            new_instance: None,
            target: None,
            cases: Vec::new(),
            before_call: None,
            check: None,
            cleanup: None,
            teardown: None,
        }
    }
}

impl<Inst: 'static, F: 'static, I: 'static, O: 'static> MethodHarness<Inst, F, I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once before the first case. Recording a failure here skips the
    /// whole batch, teardown included.
    pub fn init(mut self, hook: impl Fn(&mut Ctx) + 'static) -> Self {
        self.init = Some(Rc::new(hook));
        self
    }

    /// Builds a fresh instance for every case execution. Required.
    pub fn new_instance(mut self, constructor: impl Fn(&mut Ctx, F) -> Inst + 'static) -> Self {
        self.new_instance = Some(Rc::new(constructor));
        self
    }

    /// The method under test. Required. In benchmark mode it is called `n()`
    /// times per round.
    pub fn target(mut self, target: impl Fn(&mut Ctx, &mut Inst, &I) -> O + 'static) -> Self {
        self.target = Some(Rc::new(target));
        self
    }

    /// Appends a case. Cases run in the order they were added.
    pub fn case(mut self, case: MethodCase<Inst, F, I, O>) -> Self {
        self.cases.push(case);
        self
    }

    pub fn cases(&self) -> &[MethodCase<Inst, F, I, O>] {
        &self.cases
    }

    /// Copies the configuration and hooks, replacing the case table.
    pub fn with_cases(&self, cases: impl IntoIterator<Item = MethodCase<Inst, F, I, O>>) -> Self {
        Self {
            init: self.init.clone(),
            new_instance: self.new_instance.clone(),
            target: self.target.clone(),
            cases: cases.into_iter().collect(),
            before_call: self.before_call.clone(),
            check: self.check.clone(),
            cleanup: self.cleanup.clone(),
            teardown: self.teardown.clone(),
        }
    }

    /// Default `before_call` for cases that do not set their own.
    pub fn before_call(mut self, hook: impl Fn(&mut Ctx, &mut Inst, &I) + 'static) -> Self {
        self.before_call = Some(Rc::new(hook));
        self
    }

    /// Default `check` for cases that do not set their own.
    pub fn check(mut self, hook: impl Fn(&mut Ctx, &Inst, &I, &O) + 'static) -> Self {
        self.check = Some(Rc::new(hook));
        self
    }

    /// Default `cleanup` for cases that do not set their own.
    pub fn cleanup(mut self, hook: impl Fn(&mut Ctx, &mut Inst) + 'static) -> Self {
        self.cleanup = Some(Rc::new(hook));
        self
    }

    /// Runs once after the last case, whether or not the cases passed.
    pub fn teardown(mut self, hook: impl Fn(&mut Ctx) + 'static) -> Self {
        self.teardown = Some(Rc::new(hook));
        self
    }

    /// Checks that the harness can run: `new_instance` and `target` are set
    /// and every case has a name.
    pub fn validate(&self) -> MesaResult<()> {
        self.required().map(|_| ())
    }

    pub(crate) fn required(&self) -> MesaResult<Required<Inst, F, I, O>> {
        let new_instance = self
            .new_instance
            .clone()
            .ok_or(MesaError::MissingField {
                field: "new_instance",
            })?;
        let target = self
            .target
            .clone()
            .ok_or(MesaError::MissingField { field: "target" })?;
        if let Some(index) = self.cases.iter().position(|case| case.name.is_empty()) {
            return Err(MesaError::UnnamedCase { index });
        }
        Ok(Required {
            new_instance,
            target,
        })
    }
}

impl<Inst, F, I, O> MethodHarness<Inst, F, I, O>
where
    Inst: 'static,
    F: Clone + Default + 'static,
    I: Clone + Default + 'static,
    O: 'static,
{
    /// Runs every case as a named sub-test of `t`.
    pub fn run(&self, t: &T) {
        runner::run_batch(t, self);
    }

    /// Runs every case as a named sub-benchmark of `b`.
    pub fn bench(&self, b: &B) {
        runner::run_batch(b, self);
    }
}

impl<Inst, F, I, O> Suite for MethodHarness<Inst, F, I, O>
where
    Inst: 'static,
    F: Clone + Default + 'static,
    I: Clone + Default + 'static,
    O: 'static,
{
    fn run(&self, t: &T) {
        MethodHarness::run(self, t);
    }
}

impl<Inst, F, I, O> BenchSuite for MethodHarness<Inst, F, I, O>
where
    Inst: 'static,
    F: Clone + Default + 'static,
    I: Clone + Default + 'static,
    O: 'static,
{
    fn bench(&self, b: &B) {
        MethodHarness::bench(self, b);
    }
}

// =============================================================================
// FUNCTION HARNESS
// =============================================================================

/// Table-driven harness for a free function from `I` to `O`.
///
/// Runs on the same engine as [`MethodHarness`], with `()` as the instance.
pub struct FunctionHarness<I, O> {
    pub(crate) init: Option<BatchFn>,
    pub(crate) target: Option<FunctionTargetFn<I, O>>,
    pub(crate) cases: Vec<FunctionCase<I, O>>,
    pub(crate) before_call: Option<FunctionBeforeCallFn<I>>,
    pub(crate) check: Option<FunctionCheckFn<I, O>>,
    pub(crate) cleanup: Option<FunctionCleanupFn>,
    pub(crate) teardown: Option<BatchFn>,
}

pub type FunctionBenchmarkHarness<I, O> = FunctionHarness<I, O>;

impl<I, O> Default for FunctionHarness<I, O> {
    fn default() -> Self {
        Self {
            init: None,
            target: None,
            cases: Vec::new(),
            before_call: None,
            check: None,
            cleanup: None,
            teardown: None,
        }
    }
}

impl<I: 'static, O: 'static> FunctionHarness<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(mut self, hook: impl Fn(&mut Ctx) + 'static) -> Self {
        self.init = Some(Rc::new(hook));
        self
    }

    /// The function under test. Required.
    pub fn target(mut self, target: impl Fn(&mut Ctx, &I) -> O + 'static) -> Self {
        self.target = Some(Rc::new(target));
        self
    }

    pub fn case(mut self, case: FunctionCase<I, O>) -> Self {
        self.cases.push(case);
        self
    }

    pub fn cases(&self) -> &[FunctionCase<I, O>] {
        &self.cases
    }

    /// Copies the configuration and hooks, replacing the case table.
    pub fn with_cases(&self, cases: impl IntoIterator<Item = FunctionCase<I, O>>) -> Self {
        Self {
            init: self.init.clone(),
            target: self.target.clone(),
            cases: cases.into_iter().collect(),
            before_call: self.before_call.clone(),
            check: self.check.clone(),
            cleanup: self.cleanup.clone(),
            teardown: self.teardown.clone(),
        }
    }

    pub fn before_call(mut self, hook: impl Fn(&mut Ctx, &I) + 'static) -> Self {
        self.before_call = Some(Rc::new(hook));
        self
    }

    pub fn check(mut self, hook: impl Fn(&mut Ctx, &I, &O) + 'static) -> Self {
        self.check = Some(Rc::new(hook));
        self
    }

    pub fn cleanup(mut self, hook: impl Fn(&mut Ctx) + 'static) -> Self {
        self.cleanup = Some(Rc::new(hook));
        self
    }

    pub fn teardown(mut self, hook: impl Fn(&mut Ctx) + 'static) -> Self {
        self.teardown = Some(Rc::new(hook));
        self
    }
}

impl<I: Clone + Default + 'static, O: 'static> FunctionHarness<I, O> {
    /// Checks that a target is set and every case has a name.
    pub fn validate(&self) -> MesaResult<()> {
        adapter::adapt(self).validate()
    }

    /// Runs every case as a sub-test of `t`.
    pub fn run(&self, t: &T) {
        adapter::adapt(self).run(t);
    }

    /// Runs every case as a sub-benchmark of `b`.
    pub fn bench(&self, b: &B) {
        adapter::adapt(self).bench(b);
    }
}

impl<I: Clone + Default + 'static, O: 'static> Suite for FunctionHarness<I, O> {
    fn run(&self, t: &T) {
        FunctionHarness::run(self, t);
    }
}

impl<I: Clone + Default + 'static, O: 'static> BenchSuite for FunctionHarness<I, O> {
    fn bench(&self, b: &B) {
        FunctionHarness::bench(self, b);
    }
}
