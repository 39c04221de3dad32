//! The execution engine shared by every harness shape and mode.
//!
//! Per case: skip check, build the instance from the resolved fields, resolve
//! the input, register the cleanup, run `before_call`, invoke the target, run
//! `check`. The cleanup is registered before anything user-supplied can fail,
//! so the host runs it exactly once however the case ends.
//!
//! The two modes differ only in [`Driver::invoke`]: a correctness run calls the
//! target once, a benchmark run calls it `b.n()` times inside the timer and
//! reports the accumulated metrics as per-operation averages.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::case::{MethodCase, TargetFn};
use crate::context::{Ctx, Handle};
use crate::harness::{MethodHarness, Required};
use crate::host::{TestingT, B, T};
use crate::resolve::{provide, resolve};

pub(crate) trait Driver: TestingT + Clone + 'static {
    fn handle(&self) -> Handle;

    /// Runs `body` as a named child scenario.
    fn sub_run(&self, name: &str, body: &dyn Fn(&Self)) -> bool;

    fn invoke<Inst, I, O>(
        &self,
        ctx: &RefCell<Ctx>,
        target: &TargetFn<Inst, I, O>,
        inst: &RefCell<Inst>,
        input: &I,
    ) -> O;
}

impl Driver for T {
    fn handle(&self) -> Handle {
        Handle::Test(self.clone())
    }

    fn sub_run(&self, name: &str, body: &dyn Fn(&Self)) -> bool {
        self.run(name, body)
    }

    fn invoke<Inst, I, O>(
        &self,
        ctx: &RefCell<Ctx>,
        target: &TargetFn<Inst, I, O>,
        inst: &RefCell<Inst>,
        input: &I,
    ) -> O {
        target(&mut ctx.borrow_mut(), &mut inst.borrow_mut(), input)
    }
}

impl Driver for B {
    fn handle(&self) -> Handle {
        Handle::Bench(self.clone())
    }

    fn sub_run(&self, name: &str, body: &dyn Fn(&Self)) -> bool {
        self.run(name, body)
    }

    fn invoke<Inst, I, O>(
        &self,
        ctx: &RefCell<Ctx>,
        target: &TargetFn<Inst, I, O>,
        inst: &RefCell<Inst>,
        input: &I,
    ) -> O {
        let n = self.n().max(1);
        let mut ctx = ctx.borrow_mut();
        let mut inst = inst.borrow_mut();

        self.reset_timer();
        let mut out = target(&mut ctx, &mut inst, input);
        for _ in 1..n {
            out = target(&mut ctx, &mut inst, input);
        }
        self.stop_timer();

        for (name, total) in ctx.take_metrics() {
            self.report_metric(total / n as f64, &name);
        }
        out
    }
}

/// Runs `init`, every case as a sub-run of `driver`, then `teardown`.
pub(crate) fn run_batch<D, Inst, F, I, O>(driver: &D, harness: &MethodHarness<Inst, F, I, O>)
where
    D: Driver,
    Inst: 'static,
    F: Clone + Default + 'static,
    I: Clone + Default + 'static,
    O: 'static,
{
    let required = match harness.required() {
        Ok(required) => required,
        Err(err) => {
            warn!(scenario = driver.name(), error = %err, "invalid harness");
            driver.fatal(err.to_string())
        }
    };

    let mut seen = HashSet::new();
    for case in &harness.cases {
        if !seen.insert(case.name()) {
            warn!(scenario = driver.name(), case = case.name(), "duplicate case name");
        }
    }

    let mut ctx = Ctx::new(driver.handle());
    if let Some(init) = &harness.init {
        let errors = driver.error_count();
        init(&mut ctx);
        if driver.error_count() > errors {
            warn!(scenario = driver.name(), "init failed, skipping every case");
            return;
        }
    }

    for case in &harness.cases {
        driver.sub_run(case.name(), &|driver: &D| {
            run_case(driver, harness, &required, case)
        });
    }

    if let Some(teardown) = &harness.teardown {
        teardown(&mut ctx);
    }
}

fn run_case<D, Inst, F, I, O>(
    driver: &D,
    harness: &MethodHarness<Inst, F, I, O>,
    required: &Required<Inst, F, I, O>,
    case: &MethodCase<Inst, F, I, O>,
) where
    D: Driver,
    Inst: 'static,
    F: Clone + Default + 'static,
    I: Clone + Default + 'static,
    O: 'static,
{
    if let Some(reason) = case.skip_reason() {
        debug!(case = driver.name(), reason, "skipped");
        driver.skip(reason);
    }

    let ctx = Rc::new(RefCell::new(Ctx::new(driver.handle())));
    let (inst, input) = {
        let mut ctx = ctx.borrow_mut();
        let fields = provide(
            case.fields_fn.as_ref().map(|provider| provider(&mut ctx)),
            case.fields.as_ref(),
        );
        let inst = (required.new_instance)(&mut ctx, fields);
        let input = provide(
            case.input_fn.as_ref().map(|provider| provider(&mut ctx, &inst)),
            case.input.as_ref(),
        );
        (Rc::new(RefCell::new(inst)), input)
    };

    let cleanup = resolve(case.cleanup.as_ref(), harness.cleanup.as_ref());
    if let Some(hook) = cleanup.hook {
        let ctx = Rc::clone(&ctx);
        let inst = Rc::clone(&inst);
        driver.cleanup(move || hook(&mut ctx.borrow_mut(), &mut inst.borrow_mut()));
    }

    let before_call = resolve(case.before_call.as_ref(), harness.before_call.as_ref());
    if let Some(hook) = &before_call.hook {
        hook(&mut ctx.borrow_mut(), &mut inst.borrow_mut(), &input);
    }

    let out = driver.invoke(&ctx, &required.target, &inst, &input);

    let check = resolve(case.check.as_ref(), harness.check.as_ref());
    if let Some(hook) = &check.hook {
        hook(&mut ctx.borrow_mut(), &inst.borrow(), &input, &out);
    }

    debug!(
        case = driver.name(),
        before_call = ?before_call.source,
        check = ?check.source,
        cleanup = ?cleanup.source,
        "hooks resolved"
    );
}
