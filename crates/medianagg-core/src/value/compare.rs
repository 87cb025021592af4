use crate::{capability::TextMode, value::Value};
use std::{borrow::Cow, cmp::Ordering};

/// Strict comparator for identical orderable variants.
///
/// Floats compare under IEEE total order so equality agrees with ordering:
/// `-0.0 < 0.0` and NaN sorts above every number.
///
/// Returns `None` for mismatched or non-orderable variants.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value, mode: TextMode) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Float32(a), Value::Float32(b)) => Some(a.total_cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => Some(a.total_cmp(b)),
        (Value::Int16(a), Value::Int16(b)) => Some(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(cmp_text(a, b, mode)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Uint64(a), Value::Uint64(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn cmp_text(left: &str, right: &str, mode: TextMode) -> Ordering {
    match mode {
        TextMode::Cs => left.cmp(right),
        TextMode::Ci => {
            // Ties under folding fall back to binary order so the order stays total.
            fold_ci(left)
                .cmp(&fold_ci(right))
                .then_with(|| left.cmp(right))
        }
    }
}

fn fold_ci(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Cow::Owned(s.to_ascii_lowercase());
        }
        return Cow::Borrowed(s);
    }
    // NOTE: Unicode fallback uses simple lowercase mapping, not full casefold.
    Cow::Owned(s.to_lowercase())
}
