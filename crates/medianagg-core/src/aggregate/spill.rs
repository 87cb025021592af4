//! Module: aggregate::spill
//! Responsibility: the one-time move from the in-memory buffer to an
//! external sort session.
//! Does not own: deciding when to spill (the accumulator checks `is_full`).
//! Boundary: all-or-nothing; a failed spill leaves no live session behind.

use crate::{
    aggregate::{pipeline::ExternalPipeline, selector::BoundedSelector},
    capability::ValueCapability,
    error::InternalError,
    obs::sink::{self, MetricsEvent},
    sort::SortSessionFactory,
};

/// Flush every buffered value into a fresh external pipeline.
///
/// The selector is consumed either way. On error the partially filled
/// pipeline is dropped here, which ends its session and removes run files.
pub fn spill_to_external(
    selector: BoundedSelector,
    factory: &dyn SortSessionFactory,
    capability: &ValueCapability,
) -> Result<ExternalPipeline, InternalError> {
    let mut pipeline = ExternalPipeline::begin(factory, capability.ordering())?;

    let values = selector.into_values();
    let flushed = values.len() as u64;
    for slot in values {
        pipeline.insert(slot)?;
    }

    sink::record(MetricsEvent::Spill {
        kind: capability.kind(),
        flushed,
    });

    Ok(pipeline)
}
