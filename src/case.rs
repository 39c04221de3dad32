//! Case descriptions and hook signatures.
//!
//! A case is one row of a table-driven test: a name, an optional skip reason,
//! the construction fields and input (literal or computed by a provider) and
//! optional hook overrides. Cases are built with consuming builder methods and
//! are read-only once handed to a harness.

use std::rc::Rc;

use crate::context::Ctx;

// =============================================================================
// HOOK SIGNATURES
// =============================================================================

pub type NewInstanceFn<Inst, F> = Rc<dyn Fn(&mut Ctx, F) -> Inst>;
pub type TargetFn<Inst, I, O> = Rc<dyn Fn(&mut Ctx, &mut Inst, &I) -> O>;
pub type FieldsFn<F> = Rc<dyn Fn(&mut Ctx) -> F>;
pub type InputFn<Inst, I> = Rc<dyn Fn(&mut Ctx, &Inst) -> I>;
pub type BeforeCallFn<Inst, I> = Rc<dyn Fn(&mut Ctx, &mut Inst, &I)>;
pub type CheckFn<Inst, I, O> = Rc<dyn Fn(&mut Ctx, &Inst, &I, &O)>;
pub type CleanupFn<Inst> = Rc<dyn Fn(&mut Ctx, &mut Inst)>;

/// Batch-level `init` / `teardown`.
pub type BatchFn = Rc<dyn Fn(&mut Ctx)>;

pub type FunctionTargetFn<I, O> = Rc<dyn Fn(&mut Ctx, &I) -> O>;
pub type FunctionInputFn<I> = Rc<dyn Fn(&mut Ctx) -> I>;
pub type FunctionBeforeCallFn<I> = Rc<dyn Fn(&mut Ctx, &I)>;
pub type FunctionCheckFn<I, O> = Rc<dyn Fn(&mut Ctx, &I, &O)>;
pub type FunctionCleanupFn = Rc<dyn Fn(&mut Ctx)>;

// =============================================================================
// METHOD CASES
// =============================================================================

/// A case for a method under test on an instance of `Inst` built from `F`.
///
/// Providers win over literals: when both `fields_fn` and `fields` are set,
/// only the provider is used, and it is called fresh for every execution.
/// Missing fields or input default to `F::default()` / `I::default()`.
pub struct MethodCase<Inst, F, I, O> {
    pub(crate) name: String,
    pub(crate) skip: Option<String>,
    pub(crate) fields: Option<F>,
    pub(crate) fields_fn: Option<FieldsFn<F>>,
    pub(crate) input: Option<I>,
    pub(crate) input_fn: Option<InputFn<Inst, I>>,
    pub(crate) before_call: Option<BeforeCallFn<Inst, I>>,
    pub(crate) check: Option<CheckFn<Inst, I, O>>,
    pub(crate) cleanup: Option<CleanupFn<Inst>>,
}

/// Benchmark cases carry the same data as correctness cases.
pub type MethodBenchmarkCase<Inst, F, I, O> = MethodCase<Inst, F, I, O>;

impl<Inst, F: Clone, I: Clone, O> Clone for MethodCase<Inst, F, I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            skip: self.skip.clone(),
            fields: self.fields.clone(),
            fields_fn: self.fields_fn.clone(),
            input: self.input.clone(),
            input_fn: self.input_fn.clone(),
            before_call: self.before_call.clone(),
            check: self.check.clone(),
            cleanup: self.cleanup.clone(),
        }
    }
}

impl<Inst: 'static, F: 'static, I: 'static, O: 'static> MethodCase<Inst, F, I, O> {
    /// Starts a case with no data and no hook overrides. The name must not be
    /// empty; it becomes the sub-run name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip: None,
            fields: None,
            fields_fn: None,
            input: None,
            input_fn: None,
            before_call: None,
            check: None,
            cleanup: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The skip reason, if one was given and it is not empty.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref().filter(|reason| !reason.is_empty())
    }

    /// Registers the case but never executes it. An empty reason is ignored.
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    /// Literal construction fields, cloned into every execution.
    pub fn fields(mut self, fields: F) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Computes the construction fields for each execution. Wins over
    /// [`MethodCase::fields`].
    pub fn fields_fn(mut self, provider: impl Fn(&mut Ctx) -> F + 'static) -> Self {
        self.fields_fn = Some(Rc::new(provider));
        self
    }

    pub fn input(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    /// Computes the input once the instance exists. Wins over
    /// [`MethodCase::input`].
    pub fn input_fn(mut self, provider: impl Fn(&mut Ctx, &Inst) -> I + 'static) -> Self {
        self.input_fn = Some(Rc::new(provider));
        self
    }

    /// Overrides the harness `before_call` for this case only.
    pub fn before_call(mut self, hook: impl Fn(&mut Ctx, &mut Inst, &I) + 'static) -> Self {
        self.before_call = Some(Rc::new(hook));
        self
    }

    /// Overrides the harness `check`. Receives the instance after the call,
    /// the input and the target's output.
    pub fn check(mut self, hook: impl Fn(&mut Ctx, &Inst, &I, &O) + 'static) -> Self {
        self.check = Some(Rc::new(hook));
        self
    }

    /// Overrides the harness `cleanup`. It is registered before the target
    /// runs, so it runs once however the case exits.
    pub fn cleanup(mut self, hook: impl Fn(&mut Ctx, &mut Inst) + 'static) -> Self {
        self.cleanup = Some(Rc::new(hook));
        self
    }
}

// =============================================================================
// FUNCTION CASES
// =============================================================================

/// A case for a free function taking `I` and returning `O`.
pub struct FunctionCase<I, O> {
    pub(crate) name: String,
    pub(crate) skip: Option<String>,
    pub(crate) input: Option<I>,
    pub(crate) input_fn: Option<FunctionInputFn<I>>,
    pub(crate) before_call: Option<FunctionBeforeCallFn<I>>,
    pub(crate) check: Option<FunctionCheckFn<I, O>>,
    pub(crate) cleanup: Option<FunctionCleanupFn>,
}

pub type FunctionBenchmarkCase<I, O> = FunctionCase<I, O>;

impl<I: Clone, O> Clone for FunctionCase<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            skip: self.skip.clone(),
            input: self.input.clone(),
            input_fn: self.input_fn.clone(),
            before_call: self.before_call.clone(),
            check: self.check.clone(),
            cleanup: self.cleanup.clone(),
        }
    }
}

impl<I: 'static, O: 'static> FunctionCase<I, O> {
    /// Starts a case with no input and no hook overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip: None,
            input: None,
            input_fn: None,
            before_call: None,
            check: None,
            cleanup: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref().filter(|reason| !reason.is_empty())
    }

    /// See [`MethodCase::skip`].
    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        self.skip = Some(reason.into());
        self
    }

    pub fn input(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    /// Computes the input for each execution. Wins over [`FunctionCase::input`].
    pub fn input_fn(mut self, provider: impl Fn(&mut Ctx) -> I + 'static) -> Self {
        self.input_fn = Some(Rc::new(provider));
        self
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
}
