//! Metrics sink boundary.
//!
//! Aggregation logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between aggregation logic
//! and the thread-local metrics state.
use crate::obs::metrics;
use medianagg_primitives::ScalarKind;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    AggregateStart {
        kind: ScalarKind,
        external: bool,
    },
    Spill {
        kind: ScalarKind,
        flushed: u64,
    },
    RunWritten {
        rows: u64,
        bytes: u64,
    },
    RunsMerged {
        runs: u64,
        rows: u64,
    },
    Finalize {
        kind: ScalarKind,
        external: bool,
        count: u64,
    },
    Release {
        finalized: bool,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::AggregateStart { kind, external } => {
                metrics::with_state_mut(|m| {
                    m.ops.aggregates_started = m.ops.aggregates_started.saturating_add(1);
                    if external {
                        m.ops.direct_external_starts =
                            m.ops.direct_external_starts.saturating_add(1);
                    }

                    let entry = m.kinds.entry(kind.label().to_string()).or_default();
                    entry.aggregates_started = entry.aggregates_started.saturating_add(1);
                });
            }

            MetricsEvent::Spill { kind, flushed } => {
                metrics::with_state_mut(|m| {
                    m.ops.spills = m.ops.spills.saturating_add(1);
                    m.ops.values_flushed = m.ops.values_flushed.saturating_add(flushed);

                    let entry = m.kinds.entry(kind.label().to_string()).or_default();
                    entry.spills = entry.spills.saturating_add(1);
                });
            }

            MetricsEvent::RunWritten { rows, bytes } => {
                metrics::with_state_mut(|m| {
                    m.ops.runs_written = m.ops.runs_written.saturating_add(1);
                    m.ops.run_rows_written = m.ops.run_rows_written.saturating_add(rows);
                    m.ops.run_bytes_written = m.ops.run_bytes_written.saturating_add(bytes);
                });
            }

            MetricsEvent::RunsMerged { runs, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.intermediate_merges = m.ops.intermediate_merges.saturating_add(1);
                    m.ops.runs_merged = m.ops.runs_merged.saturating_add(runs);
                    m.ops.merged_rows = m.ops.merged_rows.saturating_add(rows);
                });
            }

            MetricsEvent::Finalize {
                kind,
                external,
                count,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.aggregates_finalized = m.ops.aggregates_finalized.saturating_add(1);
                    m.ops.rows_finalized = m.ops.rows_finalized.saturating_add(count);
                    if external {
                        m.ops.external_finalizes = m.ops.external_finalizes.saturating_add(1);
                    } else {
                        m.ops.quickselect_finalizes =
                            m.ops.quickselect_finalizes.saturating_add(1);
                    }

                    let entry = m.kinds.entry(kind.label().to_string()).or_default();
                    entry.aggregates_finalized = entry.aggregates_finalized.saturating_add(1);
                    entry.rows_finalized = entry.rows_finalized.saturating_add(count);
                });
            }

            MetricsEvent::Release { finalized } => {
                metrics::with_state_mut(|m| {
                    m.ops.aggregates_released = m.ops.aggregates_released.saturating_add(1);
                    if !finalized {
                        m.ops.aggregates_aborted = m.ops.aggregates_aborted.saturating_add(1);
                    }
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - We materialize only a shared reference (`&dyn MetricsSink`), matching the
        //   original shared borrow used to install the override.
        // - No mutable alias to the same sink is created here.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    //
    // Aliasing:
    // - We erase lifetime to a raw pointer, but still only expose shared access.
    // - No mutable alias to the same sink is introduced by this conversion.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}
