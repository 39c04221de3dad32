//! Host configuration.
//!
//! A plain struct with terminal-aware defaults. Values can be overlaid from the
//! environment (`MESA_RUN`, `MESA_BENCHTIME`, `NO_COLOR`) or set explicitly with
//! the `with_*` helpers.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{MesaError, MesaResult};

const ENV_FILTER: &str = "MESA_RUN";
const ENV_BENCH_TIME: &str = "MESA_BENCHTIME";
const ENV_NO_COLOR: &str = "NO_COLOR";

/// How long each benchmark case is measured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchTime {
    /// Let criterion calibrate and sample for about this long.
    Duration(Duration),
    /// Run exactly this many iterations in the measured round.
    Iterations(u64),
}

impl Default for BenchTime {
    fn default() -> Self {
        BenchTime::Duration(Duration::from_secs(1))
    }
}

impl fmt::Display for BenchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchTime::Duration(d) => write!(f, "{d:?}"),
            BenchTime::Iterations(n) => write!(f, "{n}x"),
        }
    }
}

impl FromStr for BenchTime {
    type Err = MesaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || MesaError::InvalidBenchTime {
            value: s.to_string(),
        };

        if let Some(count) = raw.strip_suffix('x') {
            let n: u64 = count.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(invalid());
            }
            return Ok(BenchTime::Iterations(n));
        }

        // Longest suffixes first so "ms" is not read as "s".
        let units: [(&str, u128); 7] = [
            ("ns", 1),
            ("us", 1_000),
            ("µs", 1_000),
            ("ms", 1_000_000),
            ("s", NANOS_PER_SEC),
            ("m", 60 * NANOS_PER_SEC),
            ("h", 3_600 * NANOS_PER_SEC),
        ];
        for (suffix, scale) in units {
            if let Some(amount) = raw.strip_suffix(suffix) {
                return match scaled_nanos(amount, scale).and_then(duration_from_nanos) {
                    Some(d) if !d.is_zero() => Ok(BenchTime::Duration(d)),
                    _ => Err(invalid()),
                };
            }
        }
        Err(invalid())
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Parses a decimal amount such as `1.5` and scales it to nanoseconds.
/// Digits past nanosecond precision are truncated; overflow yields `None`.
fn scaled_nanos(amount: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;
    let mut place = scale;
    for digit in fraction.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        nanos = nanos.checked_add(u128::from(digit - b'0') * place)?;
    }
    Some(nanos)
}

fn duration_from_nanos(nanos: u128) -> Option<Duration> {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).ok()?;
    // The remainder is below one second, so it fits in u32.
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, subsec))
}

/// Configuration shared by every handle created from one root run.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Slash-separated pattern; each level selects sub-runs whose name at that
    /// depth contains it.
    pub filter: Option<String>,
    pub use_colors: bool,
    pub bench_time: BenchTime,
    /// Upper bound on `N` for a fixed iteration bench time.
    pub max_iterations: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            filter: None,
            use_colors: atty::is(atty::Stream::Stderr),
            bench_time: BenchTime::default(),
            max_iterations: 1_000_000_000,
        }
    }
}

impl HostConfig {
    /// Defaults overlaid with `MESA_RUN`, `MESA_BENCHTIME` and `NO_COLOR`.
    pub fn from_env() -> MesaResult<Self> {
        let mut config = Self::default();
        if let Ok(filter) = env::var(ENV_FILTER) {
            config = config.with_filter(filter);
        }
        if let Ok(bench_time) = env::var(ENV_BENCH_TIME) {
            config.bench_time = bench_time.parse()?;
        }
        if env::var_os(ENV_NO_COLOR).is_some() {
            config.use_colors = false;
        }
        Ok(config)
    }

    /// Sets the name filter. Blank filters are ignored.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter.to_lowercase())
        };
        self
    }

    pub fn with_bench_time(mut self, bench_time: BenchTime) -> Self {
        self.bench_time = bench_time;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Returns the skip reason for a sub-run path excluded by the filter.
    ///
    /// The filter is split on `/` and matched level by level against the path
    /// below the root, so `buffer/full` selects the `full` cases of the
    /// `buffer` suite. Levels deeper than the filter always match.
    pub(crate) fn filter_reason(&self, path: &str) -> Option<String> {
        let filter = self.filter.as_deref()?;
        let path = path.to_lowercase();
        let selected = filter
            .split('/')
            .zip(path.split('/'))
            .all(|(wanted, level)| level.contains(wanted));
        if selected {
            None
        } else {
            Some(format!("filtered out by pattern: {filter}"))
        }
    }
}
