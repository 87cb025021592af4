use medianagg_primitives::ScalarKind;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every aggregation failure surfaces as one of these; none are swallowed.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    /// Construct an InternalError from its parts.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a context-misuse error (call outside a valid aggregation sequence).
    pub(crate) fn context_misuse(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ContextMisuse, origin, message)
    }

    /// Construct the setup failure raised when a kind has no ordering capability.
    pub(crate) fn unsupported_type(kind: ScalarKind) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Capability,
            format!("median is not supported for value type {kind}: no ordering capability"),
        )
    }

    /// Construct a capability-origin unsupported error.
    pub(crate) fn capability_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Capability, message)
    }

    /// Construct a sort-origin resource exhaustion error.
    pub(crate) fn sort_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ResourceExhaustion, ErrorOrigin::Sort, message)
    }

    /// Construct a sort-origin corruption error.
    pub(crate) fn sort_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Sort, message)
    }

    /// Construct an invariant violation for a specific origin.
    pub(crate) fn invariant(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, origin, message)
    }

    /// Construct the invariant violation raised for a rank outside `1..=len`.
    pub(crate) fn rank_out_of_range(origin: ErrorOrigin, rank: u64, len: u64) -> Self {
        Self::invariant(
            origin,
            format!("rank {rank} out of range for {len} values"),
        )
    }

    /// Construct a config-origin unsupported error.
    pub(crate) fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, message)
    }

    /// Construct a serialize-origin internal error.
    pub(crate) fn serialize_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, message)
    }

    #[must_use]
    pub const fn is_context_misuse(&self) -> bool {
        matches!(self.class, ErrorClass::ContextMisuse)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class, ErrorClass::Corruption)
    }

    #[must_use]
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(self.class, ErrorClass::ResourceExhaustion)
    }

    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    ContextMisuse,
    Corruption,
    Internal,
    InvariantViolation,
    ResourceExhaustion,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ContextMisuse => "context_misuse",
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::ResourceExhaustion => "resource_exhaustion",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Accumulator,
    Capability,
    Combiner,
    Config,
    Pipeline,
    Selector,
    Serialize,
    Sort,
    Spill,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Accumulator => "accumulator",
            Self::Capability => "capability",
            Self::Combiner => "combiner",
            Self::Config => "config",
            Self::Pipeline => "pipeline",
            Self::Selector => "selector",
            Self::Serialize => "serialize",
            Self::Sort => "sort",
            Self::Spill => "spill",
        };
        write!(f, "{label}")
    }
}
