//! Module: aggregate::combiner
//! Responsibility: turn the selected middle value(s) into the median.
//! Does not own: rank selection (selector, pipeline).
//! Boundary: arithmetic goes through `ValueCapability::cast_to_real` only.

use crate::{
    capability::ValueCapability,
    config::TiePolicy,
    error::{ErrorOrigin, InternalError},
    value::Value,
};

/// Turn the selected middle value(s) into the final median.
///
/// A single value is returned untouched. Two arithmetic values are averaged
/// in `f64` and always come back as `Value::Float64`; two non-arithmetic
/// values are resolved by `tie_policy`.
///
/// Finite middles whose sum overflows are halved before adding, so the
/// average stays finite.
pub fn combine(
    capability: &ValueCapability,
    tie_policy: TiePolicy,
    low: Value,
    high: Option<Value>,
) -> Result<Value, InternalError> {
    let Some(high) = high else {
        return Ok(low);
    };

    if !capability.admits(&low) || !capability.admits(&high) {
        return Err(InternalError::invariant(
            ErrorOrigin::Combiner,
            format!(
                "middle values do not match aggregation kind {}",
                capability.kind()
            ),
        ));
    }

    if capability.is_arithmetic() {
        let a = capability.cast_to_real(&low)?;
        let b = capability.cast_to_real(&high)?;

        return Ok(Value::Float64(midpoint(a, b)));
    }

    Ok(match tie_policy {
        TiePolicy::LowerMiddle => low,
        TiePolicy::UpperMiddle => high,
    })
}

fn midpoint(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum.is_infinite() && a.is_finite() && b.is_finite() {
        a / 2.0 + b / 2.0
    } else {
        sum / 2.0
    }
}
