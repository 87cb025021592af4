//! Module: value
//! Responsibility: owned, nullable scalar values fed into aggregations.
//! Does not own: which kinds can be ordered or averaged (see `capability`).
//! Boundary: comparison is strict same-kind only (`compare`).

mod compare;

#[cfg(test)]
mod tests;

use medianagg_primitives::ScalarKind;
use serde::{Deserialize, Serialize};

// re-exports
pub use compare::strict_order_cmp;

///
/// Value
/// One owned scalar fed into an aggregation.
///
/// Null        → SQL NULL; ignored by aggregation updates.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Float32(f32),
    Float64(f64),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Null,
    Text(String),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Uint64(u64),
}

impl Value {
    ///
    /// TYPES
    ///

    /// Return the scalar kind of this value, or `None` for `Null`.
    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Blob(_) => Some(ScalarKind::Blob),
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Float32(_) => Some(ScalarKind::Float32),
            Self::Float64(_) => Some(ScalarKind::Float64),
            Self::Int16(_) => Some(ScalarKind::Int16),
            Self::Int32(_) => Some(ScalarKind::Int32),
            Self::Int64(_) => Some(ScalarKind::Int64),
            Self::Null => None,
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Timestamp(_) => Some(ScalarKind::Timestamp),
            Self::Uint64(_) => Some(ScalarKind::Uint64),
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Widen an arithmetic value to `f64`.
    ///
    /// Wide integers beyond 2^53 lose precision; averaging accepts that.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64_lossy(&self) -> Option<f64> {
        match self {
            Self::Float32(v) => Some(f64::from(*v)),
            Self::Float64(v) => Some(*v),
            Self::Int16(v) => Some(f64::from(*v)),
            Self::Int32(v) => Some(f64::from(*v)),
            Self::Int64(v) => Some(*v as f64),
            Self::Uint64(v) => Some(*v as f64),
            Self::Blob(_) | Self::Bool(_) | Self::Null | Self::Text(_) | Self::Timestamp(_) => None,
        }
    }
}

macro_rules! impl_from_for_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    f32 => Float32,
    f64 => Float64,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    String => Text,
    u64 => Uint64,
    Vec<u8> => Blob,
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
