use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for aggregation activity on this thread.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub kinds: BTreeMap<String, KindCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Aggregation lifecycle
    pub aggregates_started: u64,
    pub aggregates_finalized: u64,
    pub aggregates_released: u64,
    pub aggregates_aborted: u64,

    // Strategy
    pub direct_external_starts: u64,
    pub spills: u64,
    pub values_flushed: u64,

    // External sort
    pub runs_written: u64,
    pub run_rows_written: u64,
    pub run_bytes_written: u64,
    pub intermediate_merges: u64,
    pub runs_merged: u64,
    pub merged_rows: u64,

    // Finalization
    pub quickselect_finalizes: u64,
    pub external_finalizes: u64,
    pub rows_finalized: u64,
}

///
/// KindCounters
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct KindCounters {
    pub aggregates_started: u64,
    pub spills: u64,
    pub aggregates_finalized: u64,
    pub rows_finalized: u64,
}

///
/// EventReport
/// Point-in-time snapshot of the event state.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Build a report; `None` counters means nothing has been recorded yet.
#[must_use]
pub(crate) fn report() -> EventReport {
    let snapshot = with_state(Clone::clone);
    let empty = snapshot.ops == EventOps::default() && snapshot.kinds.is_empty();

    EventReport {
        counters: (!empty).then_some(snapshot),
    }
}
