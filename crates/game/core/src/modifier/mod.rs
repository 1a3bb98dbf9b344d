//! Derived-value modifier algebra.
//!
//! A [`ValueDelta`] is one named adjustment. A [`BaseModifier`] owns a base
//! value and an ordered list of deltas and folds them, in insertion order,
//! into an effective value:
//!
//! ```text
//! effective = fold(apply, deltas, base)
//! ```
//!
//! Ordering is significant: `+5` then `x2` over a base of 10 gives 30, while
//! `x2` then `+5` gives 25. Deltas are never sorted by operator.

mod base;
mod delta;
mod error;
mod value;

pub use base::{BaseModifier, CustomFn, DeltaKey, Disable};
pub use delta::{DeltaInfo, DeltaValue, ValueDelta, ValueDeltaData, ValueDeltaOperator};
pub use error::{DeltaError, ModifierError};
pub use value::ValueModifier;

use serde_json::Value;

/// Renders a number the way persisted documents expect: integral values
/// without a fractional part.
pub(crate) fn number_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
