//! Assertion facades.
//!
//! [`Assertions`] records failures against the run handle it was created for.
//! The non-fatal facade (`ctx.assert`) keeps the case running after a failure;
//! the fatal facade (`ctx.require`) aborts the case right after recording it.
//! Every predicate returns `true` on success so checks can be chained:
//!
//! ```rust,ignore
//! if ctx.assert.no_error(out) && ctx.assert.len(&buffer.msgs, 1) {
//!     ctx.assert.equal(input, &buffer.msgs[0]);
//! }
//! ```

use std::error::Error;
use std::fmt::{Debug, Display};

use difference::{Changeset, Difference};

use crate::context::Handle;
use crate::host::TestingT;

#[derive(Clone)]
pub struct Assertions {
    handle: Handle,
    fatal: bool,
}

impl Assertions {
    pub(crate) fn new(handle: Handle, fatal: bool) -> Self {
        Self { handle, fatal }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    fn failure(&self, message: String) -> bool {
        self.handle.error(message);
        if self.fatal {
            self.handle.fail_now();
        }
        false
    }

    /// Records an unconditional failure.
    pub fn fail(&self, message: impl Display) -> bool {
        self.failure(message.to_string())
    }

    pub fn is_true(&self, value: bool, message: impl Display) -> bool {
        value || self.failure(format!("Should be true: {message}"))
    }

    pub fn is_false(&self, value: bool, message: impl Display) -> bool {
        !value || self.failure(format!("Should be false: {message}"))
    }

    pub fn equal<V: PartialEq + Debug>(&self, expected: V, actual: V) -> bool {
        if expected == actual {
            return true;
        }
        let expected = format!("{expected:#?}");
        let actual = format!("{actual:#?}");
        let mut message = format!("Not equal:\nexpected: {expected}\nactual  : {actual}");
        if expected.contains('\n') || actual.contains('\n') {
            message.push_str("\n\nDiff:\n");
            message.push_str(&line_diff(&expected, &actual));
        }
        self.failure(message)
    }

    pub fn not_equal<V: PartialEq + Debug>(&self, expected: V, actual: V) -> bool {
        expected != actual || self.failure(format!("Should not be: {actual:?}"))
    }

    pub fn no_error<T, E: Debug>(&self, result: &Result<T, E>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => self.failure(format!("Received unexpected error:\n{err:?}")),
        }
    }

    pub fn error<T: Debug, E>(&self, result: &Result<T, E>) -> bool {
        match result {
            Ok(value) => self.failure(format!("An error is expected but got Ok({value:?})")),
            Err(_) => true,
        }
    }

    /// Passes when `target` appears in the error's `source()` chain.
    pub fn error_is<T, E, K>(&self, result: &Result<T, E>, target: &K) -> bool
    where
        E: Error + 'static,
        K: Error + PartialEq + 'static,
    {
        let Err(err) = result else {
            return self.failure(format!(
                "Target error should be in err chain:\nexpected: {target}\nin chain: <none>"
            ));
        };
        let mut chain = Vec::new();
        let mut current: Option<&(dyn Error + 'static)> = Some(err);
        while let Some(error) = current {
            if error.downcast_ref::<K>() == Some(target) {
                return true;
            }
            chain.push(error.to_string());
            current = error.source();
        }
        self.failure(format!(
            "Target error should be in err chain:\nexpected: {target}\nin chain: {}",
            chain.join("\n\t")
        ))
    }

    pub fn in_delta(&self, expected: f64, actual: f64, delta: f64) -> bool {
        if expected.is_nan() || actual.is_nan() {
            return self.failure(format!(
                "Numbers must not be NaN: expected {expected}, actual {actual}"
            ));
        }
        let diff = (expected - actual).abs();
        diff <= delta
            || self.failure(format!(
                "Max difference between {expected} and {actual} allowed is {delta}, but difference was {diff}"
            ))
    }

    pub fn len<V: Debug>(&self, items: &[V], expected: usize) -> bool {
        items.len() == expected
            || self.failure(format!(
                "{items:?} should have {expected} item(s), but has {}",
                items.len()
            ))
    }

    pub fn is_empty<V: Debug>(&self, items: &[V]) -> bool {
        items.is_empty() || self.failure(format!("Should be empty, but was {items:?}"))
    }

    pub fn is_some<V>(&self, value: &Option<V>) -> bool {
        value.is_some() || self.failure("Expected value but got None".to_string())
    }

    pub fn is_none<V: Debug>(&self, value: &Option<V>) -> bool {
        match value {
            None => true,
            Some(inner) => self.failure(format!("Expected None but got Some({inner:?})")),
        }
    }
}

fn line_diff(expected: &str, actual: &str) -> String {
    let changeset = Changeset::new(expected, actual, "\n");
    let mut out = Vec::new();
    for diff in &changeset.diffs {
        let (prefix, text) = match diff {
            Difference::Same(text) => ("  ", text),
            Difference::Rem(text) => ("- ", text),
            Difference::Add(text) => ("+ ", text),
        };
        out.extend(text.lines().map(|line| format!("{prefix}{line}")));
    }
    out.join("\n")
}
