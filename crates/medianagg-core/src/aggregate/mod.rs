//! Module: aggregate
//! Responsibility: two-tier streaming median (bounded quickselect buffer that
//! spills once into an external sort).
//! Does not own: value ordering rules (capability) or sorting (sort).
//! Boundary: `MedianAggregate::update` / `MedianAggregate::finalize` are the
//! only entry points hosts drive.

mod accumulator;
mod combiner;
mod grouped;
mod pipeline;
mod rank;
mod selector;
mod spill;

#[cfg(test)]
mod tests;

// re-exports
pub use accumulator::{MedianAggregate, MedianState};
pub use combiner::combine;
pub use grouped::GroupedMedian;
pub use pipeline::ExternalPipeline;
pub use rank::RankPosition;
pub use selector::BoundedSelector;
pub use spill::spill_to_external;
