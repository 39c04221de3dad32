//! Casting helpers for heterogeneous case tables.
//!
//! Tables that mix value types usually store them as `Box<dyn Any>` (or put
//! them in the context with [`Ctx::set_value`]). These helpers view such a
//! value as a concrete type, either fallibly or failing the case.

use std::any::{type_name, Any};

use crate::context::Ctx;
use crate::errors::{MesaError, MesaResult};

pub fn try_cast<V: Any>(value: &dyn Any) -> MesaResult<&V> {
    value.downcast_ref::<V>().ok_or(MesaError::WrongType {
        expected: type_name::<V>(),
    })
}

pub fn try_cast_boxed<V: Any>(value: Box<dyn Any>) -> MesaResult<Box<V>> {
    value.downcast::<V>().map_err(|_| MesaError::WrongType {
        expected: type_name::<V>(),
    })
}

/// Views `value` as `V`, failing the current case fatally when it is not one.
pub fn must_assert<'a, V: Any>(ctx: &Ctx, value: &'a dyn Any) -> &'a V {
    match try_cast(value) {
        Ok(value) => value,
        Err(err) => ctx.fatal(format!("Cannot assert type: {err}")),
    }
}
