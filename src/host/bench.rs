use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use criterion::Criterion;
use tracing::{debug, trace};

use super::{Common, TestingT};
use crate::config::{BenchTime, HostConfig};
use crate::report::{BenchResult, Outcome, Report};

/// Smallest sample count criterion accepts.
const CRITERION_SAMPLES: usize = 10;
/// Criterion rejects zero warm-up and measurement times.
const MIN_CRITERION_TIME: Duration = Duration::from_millis(1);

struct Timer {
    n: Cell<u64>,
    running: Cell<bool>,
    start: Cell<Instant>,
    duration: Cell<Duration>,
    metrics: RefCell<BTreeMap<String, f64>>,
}

impl Timer {
    fn new() -> Self {
        Self {
            n: Cell::new(1),
            running: Cell::new(false),
            start: Cell::new(Instant::now()),
            duration: Cell::new(Duration::ZERO),
            metrics: RefCell::new(BTreeMap::new()),
        }
    }
}

/// Benchmark run handle.
///
/// Every sub-benchmark started with [`B::run`] is executed in rounds. The first
/// round runs with `n() == 1`. After that, a fixed iteration bench time runs one
/// more round of exactly that size. A duration bench time hands the body to
/// criterion, which picks each round's `n()`, calibrates and prints its own
/// statistics. Only the final round is kept in the report.
#[derive(Clone)]
pub struct B {
    common: Rc<Common>,
    timer: Rc<Timer>,
}

impl TestingT for B {
    fn common(&self) -> &Common {
        &self.common
    }
}

impl B {
    fn from_common(common: Common) -> Self {
        Self {
            common: Rc::new(common),
            timer: Rc::new(Timer::new()),
        }
    }

    /// Iterations the target should run in the current round.
    pub fn n(&self) -> u64 {
        self.timer.n.get()
    }

    pub fn start_timer(&self) {
        if !self.timer.running.get() {
            self.timer.start.set(Instant::now());
            self.timer.running.set(true);
        }
    }

    pub fn stop_timer(&self) {
        if self.timer.running.get() {
            let lap = self.timer.start.get().elapsed();
            self.timer.duration.set(self.timer.duration.get() + lap);
            self.timer.running.set(false);
        }
    }

    /// Zeroes the elapsed time without changing whether the timer runs.
    pub fn reset_timer(&self) {
        if self.timer.running.get() {
            self.timer.start.set(Instant::now());
        }
        self.timer.duration.set(Duration::ZERO);
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.running.get()
    }

    pub fn elapsed(&self) -> Duration {
        let mut elapsed = self.timer.duration.get();
        if self.timer.running.get() {
            elapsed += self.timer.start.get().elapsed();
        }
        elapsed
    }

    /// Records a per-operation metric for this round. Reporting the same unit
    /// twice keeps the latest value.
    pub fn report_metric(&self, value: f64, unit: &str) {
        self.timer.metrics.borrow_mut().insert(unit.to_string(), value);
    }

    /// Metrics reported so far in the current round.
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        self.timer.metrics.borrow().clone()
    }

    /// Runs `f` as a named sub-benchmark and returns whether it passed.
    pub fn run(&self, name: &str, f: impl Fn(&B)) -> bool {
        let child = B::from_common(self.common.child(name));
        if !child.common.apply_filter() {
            debug!(benchmark = child.name(), "running");
            child.run_round(1, &f);
            // Containers run once; their children are measured individually.
            if child.measurable() {
                child.measure(&f);
            }
        }

        let bench = child.measurable().then(|| child.result());
        let record = child.common.finish(bench);
        let passed = record.outcome != Outcome::Failed;
        self.common.adopt(record);
        passed
    }

    fn measurable(&self) -> bool {
        !self.failed() && !self.skipped() && !self.common.has_children()
    }

    fn run_round(&self, n: u64, f: &dyn Fn(&B)) {
        self.timer.n.set(n);
        self.timer.metrics.borrow_mut().clear();
        self.reset_timer();
        self.start_timer();
        self.common.catch(|| f(self));
        self.stop_timer();
        self.common.run_cleanups();
        trace!(
            benchmark = self.name(),
            n,
            elapsed = ?self.timer.duration.get(),
            "round finished"
        );
    }

    fn measure(&self, f: &dyn Fn(&B)) {
        match self.config().bench_time {
            BenchTime::Iterations(n) => {
                let n = n.min(self.config().max_iterations.max(1));
                if n > 1 {
                    self.run_round(n, f);
                }
            }
            BenchTime::Duration(goal) => self.measure_with_criterion(goal, f),
        }
    }

    /// Lets criterion drive the rounds. Each `iter_custom` call is one full
    /// round of `iters` iterations, timed by the case's own timer bracketing.
    /// A round that fails or skips unwinds out of criterion and ends the
    /// measurement.
    fn measure_with_criterion(&self, goal: Duration, f: &dyn Fn(&B)) {
        let (group_name, id) = self.name().rsplit_once('/').unwrap_or(("mesa", self.name()));
        let mut criterion = Criterion::default()
            .with_output_color(self.config().use_colors)
            .without_plots()
            .sample_size(CRITERION_SAMPLES)
            .warm_up_time((goal / 4).max(MIN_CRITERION_TIME))
            .measurement_time(goal.max(MIN_CRITERION_TIME));

        self.common.catch(|| {
            let mut group = criterion.benchmark_group(group_name);
            group.bench_function(id, |bencher| {
                bencher.iter_custom(|iters| {
                    self.run_round(iters, f);
                    if self.failed() || self.skipped() {
                        self.common.halt();
                    }
                    self.timer.duration.get().max(Duration::from_nanos(1))
                })
            });
            group.finish();
        });
    }

    fn result(&self) -> BenchResult {
        let n = self.n();
        let elapsed_ns = u64::try_from(self.timer.duration.get().as_nanos()).unwrap_or(u64::MAX);
        BenchResult {
            n,
            elapsed_ns,
            ns_per_op: elapsed_ns as f64 / n as f64,
            metrics: self.metrics(),
        }
    }
}

/// Runs `f` against a fresh root benchmark handle and collects the outcome tree.
///
/// The root itself is not measured; call [`B::run`] for each benchmark.
pub fn run_benchmarks(name: &str, config: &HostConfig, f: impl FnOnce(&B)) -> Report {
    let root = B::from_common(Common::root(name, config.clone()));
    root.common.catch(|| f(&root));
    root.common.run_cleanups();
    Report::new(root.common.finish(None))
}
