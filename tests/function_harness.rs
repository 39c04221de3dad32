mod common;

use common::{quiet_config, Events};
use mesa::{run_tests, FunctionCase, FunctionHarness, MethodCase, MethodHarness, Outcome, Report};

type Adder = FunctionHarness<(i32, i32), i32>;

fn adder() -> Adder {
    FunctionHarness::new().target(|_, (a, b): &(i32, i32)| a + b)
}

#[test]
fn adder_adds() {
    let harness = adder()
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
        );

    let report = run_tests("adder", &quiet_config(), |t| harness.run(t));
    report.assert_passed();
    assert_eq!(report.summary().passed, 2);
}

#[test]
fn harness_check_applies_to_every_case() {
    let harness = adder()
        .check(|ctx, (a, b), out| {
            ctx.assert.equal(a + b, *out);
        })
        .case(FunctionCase::new("small").input((1, 1)))
        .case(FunctionCase::new("negative").input((-4, 2)))
        .case(FunctionCase::new("computed").input_fn(|_| (20, 22)));

    run_tests("adder", &quiet_config(), |t| harness.run(t)).assert_passed();
}

#[test]
fn function_hooks_run_in_order() {
    let events = Events::new();
    let (init, before, check, cleanup, teardown) = (
        events.clone(),
        events.clone(),
        events.clone(),
        events.clone(),
        events.clone(),
    );
    let harness = adder()
        .init(move |_| init.push("init"))
        .before_call(move |_, _| before.push("before_call"))
        .check(move |_, _, out| check.push(format!("check {out}")))
        .cleanup(move |_| cleanup.push("cleanup"))
        .teardown(move |_| teardown.push("teardown"))
        .case(FunctionCase::new("sum").input((2, 3)));

    run_tests("adder", &quiet_config(), |t| harness.run(t)).assert_passed();
    assert_eq!(
        events.take(),
        vec!["init", "before_call", "check 5", "cleanup", "teardown"]
    );
}

#[test]
fn skipped_function_case_never_calls_target() {
    let events = Events::new();
    let target = events.clone();
    let harness: FunctionHarness<(), ()> = FunctionHarness::new()
        .target(move |_, _| target.push("target"))
        .case(FunctionCase::new("skipped").skip("no reason to run"));

    let report = run_tests("skip", &quiet_config(), |t| harness.run(t));
    assert!(events.take().is_empty());
    assert!(report.find("skip/skipped").unwrap().outcome.is_skipped());
}

#[test]
fn missing_function_target_fails_fast() {
    let harness: Adder = FunctionHarness::new().case(FunctionCase::new("unused"));
    let report = run_tests("adder", &quiet_config(), |t| harness.run(t));
    assert_eq!(
        report.root().errors,
        vec!["harness is missing required `target`".to_string()]
    );
}

fn outcomes(report: &Report) -> Vec<(String, Outcome)> {
    report
        .root()
        .scenarios()
        .into_iter()
        .map(|record| (record.name.clone(), record.outcome.clone()))
        .collect()
}

#[test]
fn function_harness_matches_equivalent_method_harness() {
    let function = adder()
        .case(FunctionCase::new("passes").input((1, 2)).check(|ctx, _, out| {
            ctx.assert.equal(3, *out);
        }))
        .case(FunctionCase::new("fails").input((1, 2)).check(|ctx, _, out| {
            ctx.assert.equal(4, *out);
        }))
        .case(FunctionCase::new("fatal").input((1, 2)).check(|ctx, _, out| {
            ctx.require.equal(5, *out);
        }))
        .case(FunctionCase::new("skipped").skip("later"));

    let method: MethodHarness<(), (), (i32, i32), i32> = MethodHarness::new()
        .new_instance(|_, _| ())
        .target(|_, _, (a, b): &(i32, i32)| a + b)
        .case(MethodCase::new("passes").input((1, 2)).check(|ctx, _, _, out| {
            ctx.assert.equal(3, *out);
        }))
        .case(MethodCase::new("fails").input((1, 2)).check(|ctx, _, _, out| {
            ctx.assert.equal(4, *out);
        }))
        .case(MethodCase::new("fatal").input((1, 2)).check(|ctx, _, _, out| {
            ctx.require.equal(5, *out);
        }))
        .case(MethodCase::new("skipped").skip("later"));

    let from_function = run_tests("adder", &quiet_config(), |t| function.run(t));
    let from_method = run_tests("adder", &quiet_config(), |t| method.run(t));
    assert_eq!(outcomes(&from_function), outcomes(&from_method));
    assert_eq!(from_function.summary(), from_method.summary());
}

#[test]
fn with_cases_on_function_harness() {
    let base = adder().check(|ctx, _, out| {
        ctx.assert.is_true(*out > 0, "sum should be positive");
    });
    let harness = base.with_cases([
        FunctionCase::new("positive").input((1, 1)),
        FunctionCase::new("negative").input((-3, 1)),
    ]);

    let report = run_tests("adder", &quiet_config(), |t| harness.run(t));
    assert_eq!(report.failures(), vec!["adder/negative".to_string()]);
    let errors = &report.find("adder/negative").unwrap().errors;
    assert_eq!(errors, &vec!["Should be true: sum should be positive".to_string()]);
}
