//! Module: sort
//! Responsibility: the external total-order sort facility used once an
//! aggregation outgrows its in-memory buffer.
//! Does not own: rank selection (see `aggregate::pipeline`).
//! Boundary: hosts may replace the default spilling session through
//! `SortSessionFactory`.

mod merge;
mod run;
mod spilling;


use crate::{capability::ValueOrdering, error::InternalError, value::Value};

// re-exports
pub use spilling::{SpillingSortFactory, SpillingSortSession};

///
/// SortSession
///
/// One bulk sort: accept values, sort once, then stream ascending values
/// forward exactly once. No re-seek and no inserts after `perform_sort`.
///

pub trait SortSession: Send {
    /// Hand one owned value to the session.
    fn put(&mut self, value: Value) -> Result<(), InternalError>;

    /// Finish input and switch the session to output mode.
    fn perform_sort(&mut self) -> Result<(), InternalError>;

    /// Next value in ascending order, or `None` once exhausted.
    fn next_value(&mut self) -> Result<Option<Value>, InternalError>;

    /// Release buffers and storage. Must be idempotent.
    fn end(&mut self);
}

///
/// SortSessionFactory
///
/// Starts sort sessions keyed by a value ordering. Failing to start is a
/// resource failure that aborts the owning aggregation.
///

pub trait SortSessionFactory: Send + Sync {
    fn begin(&self, ordering: ValueOrdering) -> Result<Box<dyn SortSession>, InternalError>;
}
