//! Per-run context handed to every hook.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

use crate::assert::Assertions;
use crate::host::{Common, TestingT, B, T};

/// The run handle a context was created for.
#[derive(Clone)]
pub enum Handle {
    Test(T),
    Bench(B),
}

impl TestingT for Handle {
    fn common(&self) -> &Common {
        match self {
            Handle::Test(t) => t.common(),
            Handle::Bench(b) => b.common(),
        }
    }
}

impl From<&T> for Handle {
    fn from(t: &T) -> Self {
        Handle::Test(t.clone())
    }
}

impl From<&B> for Handle {
    fn from(b: &B) -> Self {
        Handle::Bench(b.clone())
    }
}

/// Execution context for one case, or for a batch's `init` / `teardown`.
///
/// Carries the run handle, named values, accumulated benchmark metrics and two
/// assertion facades: [`Ctx::assert`] records a failure and continues,
/// [`Ctx::require`] records a failure and aborts the case.
pub struct Ctx {
    handle: Handle,
    values: HashMap<String, Box<dyn Any>>,
    metrics: BTreeMap<String, f64>,
    pub assert: Assertions,
    pub require: Assertions,
}

impl Ctx {
    pub fn new(handle: Handle) -> Self {
        Self {
            assert: Assertions::new(handle.clone(), false),
            require: Assertions::new(handle.clone(), true),
            handle,
            values: HashMap::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn is_benchmark(&self) -> bool {
        matches!(self.handle, Handle::Bench(_))
    }

    /// The correctness handle. Fails the case fatally inside a benchmark.
    pub fn t(&self) -> &T {
        match &self.handle {
            Handle::Test(t) => t,
            Handle::Bench(_) => self.fatal(
                "Ctx is being used for a benchmark but you are trying to retrieve the test handle",
            ),
        }
    }

    /// The benchmark handle. Fails the case fatally inside a correctness run.
    pub fn b(&self) -> &B {
        match &self.handle {
            Handle::Bench(b) => b,
            Handle::Test(_) => self.fatal(
                "Ctx is being used for a test but you are trying to retrieve the benchmark handle",
            ),
        }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn log(&self, message: impl Into<String>) {
        self.handle.log(message);
    }

    /// Records `message` and aborts the current case.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        self.handle.fatal(message)
    }

    /// Stores `value` under `name`, replacing any previous value.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Any) {
        self.values.insert(name.into(), Box::new(value));
    }

    pub fn get_value(&self, name: &str) -> Option<&dyn Any> {
        self.values.get(name).map(|value| value.as_ref())
    }

    /// Typed lookup; `None` when the name is missing or holds another type.
    pub fn value<V: Any>(&self, name: &str) -> Option<&V> {
        self.get_value(name)?.downcast_ref::<V>()
    }

    /// Adds `value` to the running total for `name`.
    ///
    /// Totals are divided by the iteration count once the measured loop ends,
    /// so reporting once per invocation yields a per-operation average. The
    /// benchmark timer is paused while the metric is recorded. Only valid in
    /// benchmark mode; a correctness run fails fatally.
    pub fn report_metric(&mut self, value: f64, name: &str) {
        let b = self.b().clone();
        let running = b.is_timer_running();
        if running {
            b.stop_timer();
        }
        *self.metrics.entry(name.to_string()).or_insert(0.0) += value;
        if running {
            b.start_timer();
        }
    }

    /// Running total for `name` since the last flush.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub(crate) fn take_metrics(&mut self) -> BTreeMap<String, f64> {
        std::mem::take(&mut self.metrics)
    }
}
