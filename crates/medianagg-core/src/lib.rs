//! Core runtime for medianagg: streaming median aggregation over typed
//! values, with a bounded quickselect buffer that spills once into an
//! external sort session.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod capability;
pub mod config;
pub mod error;
pub mod obs;
pub mod serialize;
pub mod sort;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

pub use medianagg_primitives::{ALL_SCALAR_KINDS, ScalarFamily, ScalarKind, ScalarMetadata};

///
/// CONSTANTS
///

/// Default quickselect buffer capacity before an aggregation spills.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10_000;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No sort sessions, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        aggregate::{GroupedMedian, MedianAggregate, MedianState},
        config::MedianConfig,
        error::InternalError,
        value::Value,
    };
    pub use medianagg_primitives::ScalarKind;
}
