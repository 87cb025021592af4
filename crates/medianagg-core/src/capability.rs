//! Module: capability
//! Responsibility: per-aggregation type capability (ordering, arithmetic cast).
//! Does not own: scalar metadata (registry lives in `medianagg-primitives`).
//! Boundary: resolved once on first input and threaded through every component.

use crate::{
    error::{ErrorOrigin, InternalError},
    value::{Value, strict_order_cmp},
};
use medianagg_primitives::ScalarKind;
use serde::Deserialize;
use std::cmp::Ordering;

///
/// TextMode
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    #[default]
    Cs, // case-sensitive
    Ci, // case-insensitive
}

///
/// ValueOrdering
///
/// Total order for one value kind. Equality under this order is the only
/// equality used by selection; raw representation equality is never consulted.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValueOrdering {
    kind: ScalarKind,
    text_mode: TextMode,
}

impl ValueOrdering {
    #[must_use]
    pub const fn new(kind: ScalarKind, text_mode: TextMode) -> Self {
        Self { kind, text_mode }
    }

    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    #[must_use]
    pub const fn text_mode(&self) -> TextMode {
        self.text_mode
    }

    /// Compare two values of this ordering's kind.
    ///
    /// Values are admitted into an aggregation only after a kind check, so a
    /// mismatch here is a bug in the caller; it falls back to kind order to
    /// keep sorting total rather than panicking mid-partition.
    #[must_use]
    pub fn compare(&self, left: &Value, right: &Value) -> Ordering {
        strict_order_cmp(left, right, self.text_mode)
            .unwrap_or_else(|| left.scalar_kind().cmp(&right.scalar_kind()))
    }

    #[must_use]
    pub fn equal(&self, left: &Value, right: &Value) -> bool {
        self.compare(left, right) == Ordering::Equal
    }
}

///
/// ValueCapability
///
/// Capability object for one aggregation: kind, ordering, and the arithmetic
/// membership test plus real cast used to average two middle values.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValueCapability {
    ordering: ValueOrdering,
    arithmetic: bool,
    quickselect: bool,
}

impl ValueCapability {
    /// Resolve the capability for one kind.
    ///
    /// Kinds without an ordering cannot produce a median and fail here, at
    /// setup, rather than on the first comparison.
    pub fn resolve(kind: ScalarKind, text_mode: TextMode) -> Result<Self, InternalError> {
        if !kind.supports_ordering() {
            return Err(InternalError::unsupported_type(kind));
        }

        // Collation only applies to collatable kinds.
        let text_mode = if kind.is_collatable() {
            text_mode
        } else {
            TextMode::Cs
        };

        Ok(Self {
            ordering: ValueOrdering::new(kind, text_mode),
            arithmetic: kind.is_arithmetic(),
            quickselect: kind.supports_quickselect(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.ordering.kind()
    }

    #[must_use]
    pub const fn ordering(&self) -> ValueOrdering {
        self.ordering
    }

    #[must_use]
    pub const fn is_arithmetic(&self) -> bool {
        self.arithmetic
    }

    /// Whether the bounded in-memory buffer may be used for this kind.
    #[must_use]
    pub const fn supports_quickselect(&self) -> bool {
        self.quickselect
    }

    /// Return true when `value` belongs to this capability's kind.
    #[must_use]
    pub fn admits(&self, value: &Value) -> bool {
        value.scalar_kind() == Some(self.kind())
    }

    /// Cast one value of this kind to a real number.
    pub fn cast_to_real(&self, value: &Value) -> Result<f64, InternalError> {
        if !self.arithmetic {
            return Err(InternalError::capability_unsupported(format!(
                "no real cast for value type {}",
                self.kind()
            )));
        }

        value
            .as_f64_lossy()
            .filter(|_| self.admits(value))
            .ok_or_else(|| {
                InternalError::invariant(
                    ErrorOrigin::Capability,
                    format!("value {value:?} does not match capability kind {}", self.kind()),
                )
            })
    }
}
