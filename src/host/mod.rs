//! In-process host test-runner.
//!
//! The harness needs a host that can run named sub-scenarios, skip them,
//! register deferred cleanups and, for benchmarks, hand out an iteration count
//! and collect metrics. `cargo test` offers none of that, so this module
//! provides it:
//!
//! - [`T`] is the correctness handle, [`B`] the benchmark handle. Both are cheap
//!   clones of a shared [`Common`] record and expose it through [`TestingT`].
//! - Fatal failures and skips abort the current scenario by unwinding with a
//!   private signal payload. The enclosing sub-run boundary catches the unwind,
//!   so siblings keep running.
//! - Cleanups run last-in first-out once the scenario body has exited, no matter
//!   how it exited.

mod bench;

pub use bench::{run_benchmarks, B};
pub use test::{run_tests, T};

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::config::HostConfig;
use crate::report::{BenchResult, Outcome, Record};

/// Unwind payloads used for control flow. Raised with `resume_unwind`, so the
/// panic hook never prints them.
enum Signal {
    FailNow,
    SkipNow,
    /// Leaves an outer driver loop once the scenario has already stopped.
    Halt,
}

type Cleanup = Box<dyn FnOnce()>;

#[derive(Default)]
struct State {
    errors: Vec<String>,
    logs: Vec<String>,
    failed: bool,
    skipped: Option<String>,
    cleanups: Vec<Cleanup>,
    children: Vec<Record>,
}

/// State shared by every clone of a run handle.
pub struct Common {
    /// Full path, root name included.
    name: String,
    /// Path below the root, used for filtering.
    relative: String,
    config: Rc<HostConfig>,
    started: Instant,
    state: RefCell<State>,
}

impl Common {
    fn root(name: &str, config: HostConfig) -> Self {
        Self {
            name: name.to_string(),
            relative: String::new(),
            config: Rc::new(config),
            started: Instant::now(),
            state: RefCell::new(State::default()),
        }
    }

    fn child(&self, name: &str) -> Self {
        let relative = if self.relative.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.relative, name)
        };
        Self {
            name: format!("{}/{}", self.name, name),
            relative,
            config: Rc::clone(&self.config),
            started: Instant::now(),
            state: RefCell::new(State::default()),
        }
    }

    fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Marks a child skipped when the configured filter excludes it.
    fn apply_filter(&self) -> bool {
        match self.config.filter_reason(&self.relative) {
            Some(reason) => {
                debug!(scenario = %self.name, %reason, "filtered");
                self.state.borrow_mut().skipped = Some(reason);
                true
            }
            None => false,
        }
    }

    fn log(&self, message: String) {
        self.state.borrow_mut().logs.push(message);
    }

    fn error(&self, message: String) {
        debug!(scenario = %self.name, %message, "failure recorded");
        let mut state = self.state.borrow_mut();
        state.errors.push(message);
        state.failed = true;
    }

    fn fail_now(&self) -> ! {
        self.state.borrow_mut().failed = true;
        panic::resume_unwind(Box::new(Signal::FailNow))
    }

    fn skip(&self, reason: String) -> ! {
        self.state.borrow_mut().skipped = Some(reason);
        panic::resume_unwind(Box::new(Signal::SkipNow))
    }

    fn halt(&self) -> ! {
        panic::resume_unwind(Box::new(Signal::Halt))
    }

    fn push_cleanup(&self, cleanup: Cleanup) {
        self.state.borrow_mut().cleanups.push(cleanup);
    }

    fn failed(&self) -> bool {
        self.state.borrow().failed
    }

    fn skipped(&self) -> bool {
        self.state.borrow().skipped.is_some()
    }

    fn error_count(&self) -> usize {
        self.state.borrow().errors.len()
    }

    fn has_children(&self) -> bool {
        !self.state.borrow().children.is_empty()
    }

    /// Runs `body`, absorbing control-flow signals and recording foreign panics.
    fn catch(&self, body: impl FnOnce()) {
        let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) else {
            return;
        };
        if payload.downcast_ref::<Signal>().is_some() {
            return;
        }
        self.error(format!("panicked: {}", panic_message(payload.as_ref())));
    }

    /// Drains registered cleanups, newest first. A cleanup that fails or panics
    /// does not stop the ones registered before it.
    fn run_cleanups(&self) {
        loop {
            let next = self.state.borrow_mut().cleanups.pop();
            match next {
                Some(cleanup) => self.catch(cleanup),
                None => break,
            }
        }
    }

    fn adopt(&self, child: Record) {
        let mut state = self.state.borrow_mut();
        if child.outcome == Outcome::Failed {
            state.failed = true;
        }
        state.children.push(child);
    }

    fn finish(&self, bench: Option<BenchResult>) -> Record {
        let mut state = self.state.borrow_mut();
        let outcome = if state.failed {
            Outcome::Failed
        } else if let Some(reason) = state.skipped.take() {
            Outcome::Skipped { reason }
        } else {
            Outcome::Passed
        };
        Record {
            name: self.name.clone(),
            outcome,
            errors: std::mem::take(&mut state.errors),
            logs: std::mem::take(&mut state.logs),
            elapsed_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            bench,
            children: std::mem::take(&mut state.children),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Operations available on every run handle.
pub trait TestingT {
    fn common(&self) -> &Common;

    /// Full scenario path, e.g. `suite/case name`.
    fn name(&self) -> &str {
        &self.common().name
    }

    fn config(&self) -> &HostConfig {
        self.common().config()
    }

    fn log(&self, message: impl Into<String>) {
        self.common().log(message.into());
    }

    /// Records a failure and keeps going.
    fn error(&self, message: impl Into<String>) {
        self.common().error(message.into());
    }

    /// Marks the scenario failed and aborts it.
    fn fail_now(&self) -> ! {
        self.common().fail_now()
    }

    /// Records a failure and aborts the scenario.
    fn fatal(&self, message: impl Into<String>) -> ! {
        self.common().error(message.into());
        self.common().fail_now()
    }

    /// Marks the scenario skipped and aborts it.
    fn skip(&self, reason: impl Into<String>) -> ! {
        self.common().skip(reason.into())
    }

    /// Registers `cleanup` to run when the scenario exits.
    fn cleanup(&self, cleanup: impl FnOnce() + 'static) {
        self.common().push_cleanup(Box::new(cleanup));
    }

    /// True once the scenario or any of its children failed.
    fn failed(&self) -> bool {
        self.common().failed()
    }

    fn skipped(&self) -> bool {
        self.common().skipped()
    }

    /// Number of failures recorded directly on this scenario.
    fn error_count(&self) -> usize {
        self.common().error_count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::report::Outcome;

    fn config() -> HostConfig {
        HostConfig::default().with_colors(false)
    }

    #[test]
    fn test_cleanups_run_in_reverse_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let report = run_tests("suite", &config(), |t| {
            t.run("case", |t| {
                for i in 0..3 {
                    let order = Rc::clone(&order);
                    t.cleanup(move || order.borrow_mut().push(i));
                }
            });
        });
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert_eq!(report.summary().passed, 1);
    }

    #[test]
    fn test_fatal_aborts_only_current_case() {
        let reached = Rc::new(RefCell::new(Vec::new()));
        let report = run_tests("suite", &config(), |t| {
            let log = Rc::clone(&reached);
            t.run("fatal", move |t| {
                if !t.failed() {
                    t.fatal("boom");
                }
                log.borrow_mut().push("after fatal");
            });
            let log = Rc::clone(&reached);
            t.run("sibling", move |_| log.borrow_mut().push("sibling"));
        });
        assert_eq!(*reached.borrow(), vec!["sibling"]);
        let summary = report.summary();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(report.root().outcome, Outcome::Failed);
    }

    #[test]
    fn test_cleanup_runs_after_fatal_and_panic() {
        let cleaned = Rc::new(RefCell::new(0));
        run_tests("suite", &config(), |t| {
            for name in ["fatal", "panic"] {
                let cleaned = Rc::clone(&cleaned);
                t.run(name, move |t| {
                    let cleaned = Rc::clone(&cleaned);
                    t.cleanup(move || *cleaned.borrow_mut() += 1);
                    if t.name().ends_with("fatal") {
                        t.fatal("stop");
                    }
                    panic!("user panic");
                });
            }
        });
        assert_eq!(*cleaned.borrow(), 2);
    }

    #[test]
    fn test_foreign_panic_is_recorded() {
        let report = run_tests("suite", &config(), |t| {
            t.run("explodes", |_| panic!("kaboom"));
        });
        let record = report.find("suite/explodes").unwrap();
        assert_eq!(record.outcome, Outcome::Failed);
        assert_eq!(record.errors, vec!["panicked: kaboom".to_string()]);
    }

    #[test]
    fn test_skip_is_not_a_failure() {
        let report = run_tests("suite", &config(), |t| {
            t.run("skipped", |t| t.skip("not today"));
        });
        let record = report.find("suite/skipped").unwrap();
        assert_eq!(
            record.outcome,
            Outcome::Skipped {
                reason: "not today".to_string()
            }
        );
        assert!(!report.root().outcome.is_failed());
    }

    #[test]
    fn test_failed_skip_stays_failed() {
        let report = run_tests("suite", &config(), |t| {
            t.run("both", |t| {
                t.error("first");
                t.skip("then skip");
            });
        });
        assert_eq!(report.find("suite/both").unwrap().outcome, Outcome::Failed);
    }

    #[test]
    fn test_filter_skips_unmatched_children() {
        let ran = Rc::new(RefCell::new(Vec::new()));
        let report = run_tests("suite", &config().with_filter("keep"), |t| {
            for name in ["keep me", "drop me"] {
                let ran = Rc::clone(&ran);
                t.run(name, move |t| ran.borrow_mut().push(t.name().to_string()));
            }
        });
        assert_eq!(*ran.borrow(), vec!["suite/keep me".to_string()]);
        assert_eq!(report.summary().skipped, 1);
    }

    #[test]
    fn test_panicking_cleanup_does_not_block_others() {
        let cleaned = Rc::new(RefCell::new(false));
        let report = run_tests("suite", &config(), |t| {
            let cleaned = Rc::clone(&cleaned);
            t.run("case", move |t| {
                let cleaned = Rc::clone(&cleaned);
                t.cleanup(move || *cleaned.borrow_mut() = true);
                t.cleanup(|| panic!("cleanup failed"));
            });
        });
        assert!(*cleaned.borrow());
        assert_eq!(report.summary().failed, 1);
    }
}
