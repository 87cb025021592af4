//! Module: aggregate::pipeline
//! Responsibility: rank extraction over an external sort session.
//! Does not own: sorting itself (delegated to `SortSession`).
//! Boundary: forward-only; ranks are found by scanning sorted output once.

use crate::{
    aggregate::rank::RankPosition,
    capability::ValueOrdering,
    error::{ErrorOrigin, InternalError},
    sort::{SortSession, SortSessionFactory},
    value::Value,
};

///
/// PipelinePhase
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PipelinePhase {
    Input,
    Sorted,
    Ended,
}

///
/// ExternalPipeline
///
/// Owns one sort session for the lifetime of a spilled aggregation.
///

pub struct ExternalPipeline {
    session: Box<dyn SortSession>,
    phase: PipelinePhase,
    inserted: u64,
}

impl ExternalPipeline {
    /// Start a session keyed by `ordering`.
    pub fn begin(
        factory: &dyn SortSessionFactory,
        ordering: ValueOrdering,
    ) -> Result<Self, InternalError> {
        let session = factory.begin(ordering)?;

        Ok(Self {
            session,
            phase: PipelinePhase::Input,
            inserted: 0,
        })
    }

    /// Number of values handed to the session.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.inserted
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    pub fn insert(&mut self, slot: Value) -> Result<(), InternalError> {
        if self.phase != PipelinePhase::Input {
            return Err(InternalError::invariant(
                ErrorOrigin::Pipeline,
                "insert into external pipeline after perform_sort",
            ));
        }

        self.session.put(slot)?;
        self.inserted += 1;

        Ok(())
    }

    pub fn perform_sort(&mut self) -> Result<(), InternalError> {
        if self.phase != PipelinePhase::Input {
            return Err(InternalError::invariant(
                ErrorOrigin::Pipeline,
                "perform_sort called on a pipeline that is not accepting input",
            ));
        }

        self.session.perform_sort()?;
        self.phase = PipelinePhase::Sorted;

        Ok(())
    }

    /// Next ascending value, or `None` at end of output.
    pub fn next_value(&mut self) -> Result<Option<Value>, InternalError> {
        if self.phase != PipelinePhase::Sorted {
            return Err(InternalError::invariant(
                ErrorOrigin::Pipeline,
                "external pipeline read before perform_sort",
            ));
        }

        self.session.next_value()
    }

    /// Scan forward to the low rank; the high rank (when distinct) is the
    /// next value in the stream.
    ///
    /// Sorts first when the pipeline is still taking input.
    pub fn select_ranks(
        &mut self,
        position: RankPosition,
    ) -> Result<(Value, Option<Value>), InternalError> {
        if self.phase == PipelinePhase::Input {
            self.perform_sort()?;
        }
        if position.high() > self.inserted {
            return Err(InternalError::rank_out_of_range(
                ErrorOrigin::Pipeline,
                position.high(),
                self.inserted,
            ));
        }

        let mut seen = 0u64;
        let low = loop {
            let value = self.next_value()?.ok_or_else(|| {
                InternalError::rank_out_of_range(ErrorOrigin::Pipeline, position.low(), seen)
            })?;
            seen += 1;
            if seen == position.low() {
                break value;
            }
        };

        if position.is_single() {
            return Ok((low, None));
        }

        let high = self.next_value()?.ok_or_else(|| {
            InternalError::rank_out_of_range(ErrorOrigin::Pipeline, position.high(), seen)
        })?;

        Ok((low, Some(high)))
    }

    /// Release the session and its storage. Idempotent.
    pub fn end(&mut self) {
        if self.phase != PipelinePhase::Ended {
            self.session.end();
            self.phase = PipelinePhase::Ended;
        }
    }
}

impl std::fmt::Debug for ExternalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalPipeline")
            .field("phase", &self.phase)
            .field("inserted", &self.inserted)
            .finish_non_exhaustive()
    }
}

impl Drop for ExternalPipeline {
    fn drop(&mut self) {
        self.end();
    }
}
