//! Module: aggregate::accumulator
//! Responsibility: the `update`/`finalize` entry points and the per-aggregation
//! state they pass back and forth.
//! Does not own: selection algorithms (selector, pipeline) or result
//! arithmetic (combiner).
//! Boundary: callers only ever hold an opaque `MedianState`.

use crate::{
    aggregate::{
        combiner::combine, pipeline::ExternalPipeline, rank::RankPosition,
        selector::BoundedSelector, spill::spill_to_external,
    },
    capability::ValueCapability,
    config::MedianConfig,
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
    sort::{SortSessionFactory, SpillingSortFactory},
    value::Value,
};
use medianagg_primitives::ScalarKind;
use std::{
    fmt, mem,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
};

static NEXT_AGGREGATE_ID: AtomicU64 = AtomicU64::new(1);

///
/// MedianAggregate
///
/// Stateless driver for one median aggregation definition. Per-group state
/// lives in `MedianState` values that the caller threads through `update`
/// and hands to `finalize` exactly once.
///

pub struct MedianAggregate {
    id: u64,
    config: MedianConfig,
    factory: Arc<dyn SortSessionFactory>,
    declared: Option<ValueCapability>,
    debug: bool,
}

impl MedianAggregate {
    /// Build an aggregate whose value kind is bound by the first input.
    #[must_use]
    pub fn new(config: MedianConfig) -> Self {
        let factory = Arc::new(SpillingSortFactory::new(config.sort.clone()));

        Self {
            id: NEXT_AGGREGATE_ID.fetch_add(1, AtomicOrdering::Relaxed),
            config,
            factory,
            declared: None,
            debug: false,
        }
    }

    /// Build an aggregate for a kind known up front.
    ///
    /// The capability is resolved here, so unsupported kinds fail at setup
    /// instead of on the first value.
    pub fn for_kind(config: MedianConfig, kind: ScalarKind) -> Result<Self, InternalError> {
        let capability = ValueCapability::resolve(kind, config.text_mode)?;
        let mut aggregate = Self::new(config);
        aggregate.declared = Some(capability);

        Ok(aggregate)
    }

    /// Replace the external sort facility.
    #[must_use]
    pub fn with_sort_factory(mut self, factory: Arc<dyn SortSessionFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Enable debug logging of strategy transitions.
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &MedianConfig {
        &self.config
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.debug {
            println!("[debug] {}", s.as_ref());
        }
    }

    // ---------------------------------------------------------------------
    // Entry points
    // ---------------------------------------------------------------------

    /// Fold one value into the aggregation.
    ///
    /// Null values leave the state as it is (an absent state stays absent).
    /// On error the state passed in has been released and must not be reused.
    pub fn update(
        &self,
        state: Option<MedianState>,
        value: &Value,
    ) -> Result<Option<MedianState>, InternalError> {
        let Some(kind) = value.scalar_kind() else {
            return Ok(state);
        };

        let mut state = match state {
            Some(state) => {
                self.check_owner(&state)?;
                state
            }
            None => self.start(kind)?,
        };

        if !state.capability.admits(value) {
            return Err(InternalError::context_misuse(
                ErrorOrigin::Accumulator,
                format!(
                    "value of type {kind} passed to a {} median aggregation",
                    state.capability.kind()
                ),
            ));
        }

        self.push(&mut state, value.clone())?;

        Ok(Some(state))
    }

    /// Compute the median and release the state.
    ///
    /// An absent state (no non-null input) yields `Value::Null`.
    pub fn finalize(&self, state: Option<MedianState>) -> Result<Value, InternalError> {
        let Some(mut state) = state else {
            return Ok(Value::Null);
        };
        self.check_owner(&state)?;

        let Some(position) = RankPosition::for_count(state.count) else {
            state.release();
            return Ok(Value::Null);
        };

        let capability = state.capability;
        let ((low, high), external) = match &mut state.mode {
            MedianMode::Buffering(selector) => {
                (selector.select_pair(position, capability.ordering())?, false)
            }
            MedianMode::Spilled(pipeline) => (pipeline.select_ranks(position)?, true),
            MedianMode::Released => {
                return Err(InternalError::context_misuse(
                    ErrorOrigin::Accumulator,
                    "finalize called on a released median state",
                ));
            }
        };

        let median = combine(&capability, self.config.tie_policy, low, high)?;

        sink::record(MetricsEvent::Finalize {
            kind: capability.kind(),
            external,
            count: state.count,
        });
        state.finalized = true;
        state.release();

        Ok(median)
    }

    /// Tear down a state without producing a result.
    pub fn abort(&self, state: Option<MedianState>) {
        if let Some(mut state) = state {
            state.release();
        }
    }

    /// Run a whole aggregation over an iterator of values.
    pub fn median_of<'a>(
        &self,
        values: impl IntoIterator<Item = &'a Value>,
    ) -> Result<Value, InternalError> {
        let mut state = None;
        for value in values {
            state = self.update(state, value)?;
        }

        self.finalize(state)
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn check_owner(&self, state: &MedianState) -> Result<(), InternalError> {
        if state.owner != self.id {
            return Err(InternalError::context_misuse(
                ErrorOrigin::Accumulator,
                "median state belongs to a different aggregation",
            ));
        }

        Ok(())
    }

    // First non-null input: bind the kind and pick the starting strategy.
    fn start(&self, kind: ScalarKind) -> Result<MedianState, InternalError> {
        let capability = match self.declared {
            Some(declared) if declared.kind() != kind => {
                return Err(InternalError::context_misuse(
                    ErrorOrigin::Accumulator,
                    format!(
                        "first value has type {kind} but the aggregation was declared for {}",
                        declared.kind()
                    ),
                ));
            }
            Some(declared) => declared,
            None => ValueCapability::resolve(kind, self.config.text_mode)?,
        };

        let mode = if capability.supports_quickselect() {
            MedianMode::Buffering(BoundedSelector::new(self.config.buffer_capacity))
        } else {
            self.debug_log(format!(
                "median {}: type {kind} has no quickselect path, starting external sort",
                self.id
            ));
            MedianMode::Spilled(ExternalPipeline::begin(
                self.factory.as_ref(),
                capability.ordering(),
            )?)
        };

        sink::record(MetricsEvent::AggregateStart {
            kind,
            external: matches!(mode, MedianMode::Spilled(_)),
        });

        Ok(MedianState {
            owner: self.id,
            count: 0,
            capability,
            mode,
            finalized: false,
            released: false,
        })
    }

    fn push(&self, state: &mut MedianState, slot: Value) -> Result<(), InternalError> {
        if let MedianMode::Buffering(selector) = &state.mode
            && selector.is_full()
        {
            self.spill(state)?;
        }

        match &mut state.mode {
            MedianMode::Buffering(selector) => selector.insert(slot)?,
            MedianMode::Spilled(pipeline) => pipeline.insert(slot)?,
            MedianMode::Released => {
                return Err(InternalError::context_misuse(
                    ErrorOrigin::Accumulator,
                    "update called on a released median state",
                ));
            }
        }
        state.count += 1;

        Ok(())
    }

    // Buffering -> Spilled. The buffer leaves the state before flushing, so a
    // failure here leaves nothing behind to retry against.
    fn spill(&self, state: &mut MedianState) -> Result<(), InternalError> {
        let MedianMode::Buffering(selector) = mem::replace(&mut state.mode, MedianMode::Released)
        else {
            return Ok(());
        };

        self.debug_log(format!(
            "median {}: buffer of {} {} values full, spilling to external sort",
            self.id,
            selector.len(),
            state.capability.kind()
        ));

        let pipeline = spill_to_external(selector, self.factory.as_ref(), &state.capability)?;
        state.mode = MedianMode::Spilled(pipeline);

        Ok(())
    }
}

impl fmt::Debug for MedianAggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedianAggregate")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("declared", &self.declared.map(|c| c.kind()))
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Default for MedianAggregate {
    fn default() -> Self {
        Self::new(MedianConfig::default())
    }
}

///
/// MedianMode
///

#[derive(Debug)]
enum MedianMode {
    Buffering(BoundedSelector),
    Spilled(ExternalPipeline),
    Released,
}

///
/// MedianState
///
/// Owned aggregation state. Dropping it releases its buffer and any sort
/// session, so an abandoned aggregation never leaks run files.
///

#[derive(Debug)]
pub struct MedianState {
    owner: u64,
    count: u64,
    capability: ValueCapability,
    mode: MedianMode,
    finalized: bool,
    released: bool,
}

impl MedianState {
    /// Number of non-null values absorbed.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.capability.kind()
    }

    /// True once the aggregation has moved to the external sort.
    #[must_use]
    pub const fn is_spilled(&self) -> bool {
        matches!(self.mode, MedianMode::Spilled(_))
    }

    /// Values currently held in the in-memory buffer.
    #[must_use]
    pub const fn buffered(&self) -> usize {
        match &self.mode {
            MedianMode::Buffering(selector) => selector.len(),
            MedianMode::Spilled(_) | MedianMode::Released => 0,
        }
    }

    /// Free the buffer and end any sort session. Idempotent.
    pub fn release(&mut self) {
        if self.released {
            return;
        }

        if let MedianMode::Spilled(pipeline) = &mut self.mode {
            pipeline.end();
        }
        self.mode = MedianMode::Released;
        self.released = true;

        sink::record(MetricsEvent::Release {
            finalized: self.finalized,
        });
    }
}

impl Drop for MedianState {
    fn drop(&mut self) {
        self.release();
    }
}
