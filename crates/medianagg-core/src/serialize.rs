//! Module: serialize
//! Responsibility: CBOR encoding of values written to spill runs.
//! Does not own: run framing or frame limits (see `sort::run`).
//! Boundary: decode never panics and never reads past the caller's limit.

use crate::error::InternalError;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("cbor encode failed: {0}")]
    Encode(String),

    #[error("cbor decode failed: {0}")]
    Decode(String),

    #[error("encoded payload of {len} bytes is over the {limit} byte limit")]
    TooLarge { len: usize, limit: usize },
}

impl SerializeError {
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Encode(_) => SerializeErrorKind::Encode,
            Self::Decode(_) => SerializeErrorKind::Decode,
            Self::TooLarge { .. } => SerializeErrorKind::TooLarge,
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        Self::serialize_internal(err.to_string())
    }
}

///
/// SerializeErrorKind
///
/// Match on this rather than on backend message text.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Decode,
    Encode,
    TooLarge,
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::TooLarge => "too_large",
        })
    }
}

/// Encode `value` as CBOR.
pub fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_cbor::to_vec(value).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Decode CBOR produced by [`serialize`], refusing input over `limit` bytes.
///
/// A backend panic on hostile bytes is reported as a decode error.
pub fn deserialize_bounded<T: DeserializeOwned>(
    bytes: &[u8],
    limit: usize,
) -> Result<T, SerializeError> {
    if bytes.len() > limit {
        return Err(SerializeError::TooLarge {
            len: bytes.len(),
            limit,
        });
    }

    catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice(bytes)))
        .map_err(|_| SerializeError::Decode("decoder panicked".into()))?
        .map_err(|e| SerializeError::Decode(e.to_string()))
}
