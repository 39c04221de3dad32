//! Function harnesses on top of the method engine.
//!
//! A [`FunctionHarness`] is rewritten into a `MethodHarness<(), (), I, O>`: the
//! instance and fields are `()`, the constructor ignores its fields, and every
//! hook is wrapped to drop the instance argument. Names, inputs, input
//! providers and skip reasons are copied as they are, so both shapes share
//! one runner.

use std::rc::Rc;

use crate::case::{
    BeforeCallFn, CheckFn, CleanupFn, FunctionBeforeCallFn, FunctionCase, FunctionCheckFn,
    FunctionCleanupFn, FunctionInputFn, FunctionTargetFn, InputFn, MethodCase, NewInstanceFn,
    TargetFn,
};
use crate::context::Ctx;
use crate::harness::{FunctionHarness, MethodHarness};

pub(crate) fn adapt<I: Clone + 'static, O: 'static>(
    harness: &FunctionHarness<I, O>,
) -> MethodHarness<(), (), I, O> {
    let new_instance: NewInstanceFn<(), ()> = Rc::new(|_: &mut Ctx, _: ()| ());
    MethodHarness {
        init: harness.init.clone(),
        new_instance: Some(new_instance),
        target: harness.target.clone().map(target),
        cases: harness.cases.iter().map(adapt_case).collect(),
        before_call: harness.before_call.clone().map(before_call),
        check: harness.check.clone().map(check),
        cleanup: harness.cleanup.clone().map(cleanup),
        teardown: harness.teardown.clone(),
    }
}

fn adapt_case<I: Clone + 'static, O: 'static>(case: &FunctionCase<I, O>) -> MethodCase<(), (), I, O> {
    MethodCase {
        name: case.name.clone(),
        skip: case.skip.clone(),
        fields: None,
        fields_fn: None,
        input: case.input.clone(),
        input_fn: case.input_fn.clone().map(input_fn),
        before_call: case.before_call.clone().map(before_call),
        check: case.check.clone().map(check),
        cleanup: case.cleanup.clone().map(cleanup),
    }
}

fn target<I: 'static, O: 'static>(target: FunctionTargetFn<I, O>) -> TargetFn<(), I, O> {
    Rc::new(move |ctx: &mut Ctx, _: &mut (), input: &I| target(ctx, input))
}

fn input_fn<I: 'static>(provider: FunctionInputFn<I>) -> InputFn<(), I> {
    Rc::new(move |ctx: &mut Ctx, _: &()| provider(ctx))
}

fn before_call<I: 'static>(hook: FunctionBeforeCallFn<I>) -> BeforeCallFn<(), I> {
    Rc::new(move |ctx: &mut Ctx, _: &mut (), input: &I| hook(ctx, input))
}

fn check<I: 'static, O: 'static>(hook: FunctionCheckFn<I, O>) -> CheckFn<(), I, O> {
    Rc::new(move |ctx: &mut Ctx, _: &(), input: &I, out: &O| hook(ctx, input, out))
}

fn cleanup(hook: FunctionCleanupFn) -> CleanupFn<()> {
    Rc::new(move |ctx: &mut Ctx, _: &mut ()| hook(ctx))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::config::HostConfig;
    use crate::host::run_tests;
    use crate::report::{Outcome, Report};

    fn outcomes(report: &Report) -> Vec<(String, Outcome)> {
        report
            .root()
            .scenarios()
            .into_iter()
            .map(|record| {
                let name = record.name.rsplit('/').next().unwrap_or_default().to_string();
                (name, record.outcome.clone())
            })
            .collect()
    }

    #[test]
    fn test_copies_names_inputs_and_skips() {
        let harness: FunctionHarness<u8, u8> = FunctionHarness::new()
            .target(|_, input| *input)
            .case(FunctionCase::new("literal").input(3))
            .case(FunctionCase::new("provided").input_fn(|_| 9))
            .case(FunctionCase::new("later").skip("not yet"));
        let adapted = adapt(&harness);
        let names: Vec<_> = adapted.cases.iter().map(|case| case.name()).collect();
        assert_eq!(names, vec!["literal", "provided", "later"]);
        assert_eq!(adapted.cases[0].input, Some(3));
        assert!(adapted.cases[1].input_fn.is_some());
        assert_eq!(adapted.cases[2].skip_reason(), Some("not yet"));
        assert!(adapted.check.is_none());
    }

    #[test]
    fn test_matches_hand_written_method_harness() {
        let config = HostConfig::default().with_colors(false);
        let check_sum = |ctx: &mut Ctx, input: &(i32, i32), out: &i32| {
            ctx.assert.equal(input.0 + input.1, *out);
        };

        let function: FunctionHarness<(i32, i32), i32> = FunctionHarness::new()
            .target(|_, (a, b)| a + b)
            .check(check_sum)
            .case(FunctionCase::new("ok").input((1, 2)))
            .case(
                FunctionCase::new("wrong")
                    .input((1, 1))
                    .check(|ctx, _, out| {
                        ctx.assert.equal(3, *out);
                    }),
            )
            .case(FunctionCase::new("skipped").skip("later"));

        let method: MethodHarness<(), (), (i32, i32), i32> = MethodHarness::new()
            .new_instance(|_, _| ())
            .target(|_, _, (a, b)| a + b)
            .check(move |ctx, _, input, out| check_sum(ctx, input, out))
            .case(MethodCase::new("ok").input((1, 2)))
            .case(
                MethodCase::new("wrong")
                    .input((1, 1))
                    .check(|ctx, _, _, out| {
                        ctx.assert.equal(3, *out);
                    }),
            )
            .case(MethodCase::new("skipped").skip("later"));

        let from_function = run_tests("suite", &config, |t| function.run(t));
        let from_method = run_tests("suite", &config, |t| method.run(t));
        assert_eq!(outcomes(&from_function), outcomes(&from_method));
        assert_eq!(from_function.summary(), from_method.summary());
        assert_eq!(from_function.summary().failed, 1);
    }

    #[test]
    fn test_hooks_drop_instance_argument() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let harness: FunctionHarness<u8, u8> = FunctionHarness::new()
            .target(|_, input| input * 2)
            .cleanup(move |_| log.borrow_mut().push("cleanup"))
            .case(FunctionCase::new("double").input(4));
        let adapted = adapt(&harness);
        let config = HostConfig::default().with_colors(false);
        run_tests("suite", &config, |t| adapted.run(t)).assert_passed();
        assert_eq!(*seen.borrow(), vec!["cleanup"]);
    }
}
