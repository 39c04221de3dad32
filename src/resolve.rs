//! Hook precedence.
//!
//! For every hook kind the case-level hook wins, then the harness default, and
//! when neither is set the step is skipped. Resolution happens per case and per
//! hook kind and never writes back into the harness.

use std::rc::Rc;

/// Where a resolved hook came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookSource {
    Case,
    Harness,
    Absent,
}

/// The hook selected for one step of one case.
pub struct Resolved<H: ?Sized> {
    pub hook: Option<Rc<H>>,
    pub source: HookSource,
}

/// Selects the hook for one step: the case's hook if set, else the harness
/// default, else none. Exactly one of the two is ever returned.
pub fn resolve<H: ?Sized>(case: Option<&Rc<H>>, harness: Option<&Rc<H>>) -> Resolved<H> {
    match (case, harness) {
        (Some(hook), _) => Resolved {
            hook: Some(Rc::clone(hook)),
            source: HookSource::Case,
        },
        (None, Some(hook)) => Resolved {
            hook: Some(Rc::clone(hook)),
            source: HookSource::Harness,
        },
        (None, None) => Resolved {
            hook: None,
            source: HookSource::Absent,
        },
    }
}

/// Picks the provider's value over the literal, falling back to `V::default()`.
///
/// The literal is cloned because a benchmark re-runs the same case every round.
pub(crate) fn provide<V: Clone + Default>(provided: Option<V>, literal: Option<&V>) -> V {
    match (provided, literal) {
        (Some(value), _) => value,
        (None, Some(value)) => value.clone(),
        (None, None) => V::default(),
    }
}
