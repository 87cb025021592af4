use crate::{
    aggregate::{GroupedMedian, MedianAggregate, MedianState},
    capability::TextMode,
    config::{MedianConfig, TiePolicy},
    obs::{metrics_report, metrics_reset_all},
    test_support::FailingSortFactory,
    value::Value,
};
use medianagg_primitives::ScalarKind;
use std::sync::Arc;

// ---- helpers -----------------------------------------------------------

fn aggregate(capacity: usize) -> MedianAggregate {
    MedianAggregate::new(MedianConfig::default().with_buffer_capacity(capacity))
}

fn feed(aggregate: &MedianAggregate, values: &[Value]) -> Option<MedianState> {
    let mut state = None;
    for value in values {
        state = aggregate.update(state, value).expect("update succeeds");
    }
    state
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int64).collect()
}

// ---- results -----------------------------------------------------------

#[test]
fn odd_count_returns_middle_value_unchanged() {
    let agg = aggregate(16);
    let state = feed(&agg, &ints(&[5, 3, 8, 1, 9]));

    assert_eq!(agg.finalize(state).unwrap(), Value::Int64(5));
}

#[test]
fn even_count_averages_to_float() {
    let agg = aggregate(16);
    let state = feed(&agg, &ints(&[5, 3, 8, 1]));

    assert_eq!(agg.finalize(state).unwrap(), Value::Float64(4.0));
}

#[test]
fn empty_and_all_null_input_yield_null() {
    let agg = aggregate(16);

    assert_eq!(agg.finalize(None).unwrap(), Value::Null);

    let state = feed(&agg, &[Value::Null, Value::Null]);
    assert!(state.is_none());
    assert_eq!(agg.finalize(state).unwrap(), Value::Null);
}

#[test]
fn nulls_are_skipped_between_values() {
    let agg = aggregate(16);
    let state = feed(
        &agg,
        &[Value::Int64(2), Value::Null, Value::Int64(9), Value::Null, Value::Int64(4)],
    );

    assert_eq!(state.as_ref().map(MedianState::count), Some(3));
    assert_eq!(agg.finalize(state).unwrap(), Value::Int64(4));
}

#[test]
fn single_value_is_its_own_median() {
    let agg = aggregate(16);
    let state = feed(&agg, &[Value::Float32(2.5)]);

    assert_eq!(agg.finalize(state).unwrap(), Value::Float32(2.5));
}

// ---- strategy ----------------------------------------------------------

#[test]
fn overflow_spills_exactly_once() {
    metrics_reset_all();
    let agg = aggregate(4);

    let state = feed(&agg, &ints(&[4, 3, 2, 1]));
    assert!(!state.as_ref().unwrap().is_spilled());
    assert_eq!(state.as_ref().unwrap().buffered(), 4);

    let state = feed_more(&agg, state, &ints(&[9, 8, 7]));
    let state_ref = state.as_ref().unwrap();
    assert!(state_ref.is_spilled());
    assert_eq!(state_ref.buffered(), 0);
    assert_eq!(state_ref.count(), 7);

    assert_eq!(agg.finalize(state).unwrap(), Value::Int64(4));

    let ops = metrics_report().counters.expect("recorded").ops;
    assert_eq!(ops.spills, 1);
    assert_eq!(ops.values_flushed, 4);
    assert_eq!(ops.external_finalizes, 1);
    assert_eq!(ops.quickselect_finalizes, 0);
}

fn feed_more(
    aggregate: &MedianAggregate,
    mut state: Option<MedianState>,
    values: &[Value],
) -> Option<MedianState> {
    for value in values {
        state = aggregate.update(state, value).expect("update succeeds");
    }
    state
}

#[test]
fn capacity_boundary_gives_identical_medians() {
    let capacity = 8;
    let agg = aggregate(capacity);

    for len in [capacity - 1, capacity, capacity + 1] {
        let values: Vec<Value> = (1..=len as i64).rev().map(Value::Int64).collect();
        let expected = aggregate(1_000).median_of(&values).unwrap();

        assert_eq!(agg.median_of(&values).unwrap(), expected, "len {len}");
    }
}

#[test]
fn zero_capacity_spills_on_first_value() {
    let agg = aggregate(0);
    let state = feed(&agg, &ints(&[3]));

    assert!(state.as_ref().unwrap().is_spilled());
    assert_eq!(agg.finalize(state).unwrap(), Value::Int64(3));
}

#[test]
fn text_starts_external_and_uses_lower_middle() {
    metrics_reset_all();
    let agg = aggregate(16);
    let values: Vec<Value> = ["pear", "apple", "fig", "kiwi"].map(Value::from).to_vec();

    let state = feed(&agg, &values);
    assert!(state.as_ref().unwrap().is_spilled());
    assert_eq!(agg.finalize(state).unwrap(), Value::from("fig"));

    let ops = metrics_report().counters.expect("recorded").ops;
    assert_eq!(ops.direct_external_starts, 1);
    assert_eq!(ops.spills, 0);
}

#[test]
fn upper_middle_policy_picks_the_high_value() {
    let config = MedianConfig::default().with_tie_policy(TiePolicy::UpperMiddle);
    let agg = MedianAggregate::new(config);
    let values: Vec<Value> = ["pear", "apple", "fig", "kiwi"].map(Value::from).to_vec();

    assert_eq!(agg.median_of(&values).unwrap(), Value::from("kiwi"));
}

#[test]
fn case_insensitive_text_orders_by_folded_value() {
    let config = MedianConfig::default().with_text_mode(TextMode::Ci);
    let agg = MedianAggregate::new(config);
    let values: Vec<Value> = ["b", "C", "a"].map(Value::from).to_vec();

    assert_eq!(agg.median_of(&values).unwrap(), Value::from("b"));
}

#[test]
fn bool_and_timestamp_medians_are_ordered() {
    let agg = aggregate(16);

    let bools = [true, false, true].map(Value::Bool);
    assert_eq!(agg.median_of(&bools).unwrap(), Value::Bool(true));

    let stamps = [30, 10, 20, 40].map(Value::Timestamp);
    assert_eq!(agg.median_of(&stamps).unwrap(), Value::Timestamp(20));
}

// ---- misuse ------------------------------------------------------------

#[test]
fn blob_input_is_unsupported() {
    let agg = aggregate(16);
    let err = agg
        .update(None, &Value::Blob(vec![1, 2]))
        .expect_err("blob has no ordering");

    assert!(err.is_unsupported());
}

#[test]
fn for_kind_rejects_blob_at_setup() {
    let err = MedianAggregate::for_kind(MedianConfig::default(), ScalarKind::Blob)
        .expect_err("no ordering");

    assert!(err.is_unsupported());
}

#[test]
fn declared_kind_mismatch_is_context_misuse() {
    let agg = MedianAggregate::for_kind(MedianConfig::default(), ScalarKind::Int32).unwrap();
    let err = agg
        .update(None, &Value::Int64(1))
        .expect_err("declared int32");

    assert!(err.is_context_misuse());
}

#[test]
fn mixed_kinds_are_context_misuse() {
    let agg = aggregate(16);
    let state = feed(&agg, &ints(&[1, 2]));

    let err = agg
        .update(state, &Value::Float64(1.0))
        .expect_err("kind bound to int64");
    assert!(err.is_context_misuse());
}

#[test]
fn foreign_state_is_context_misuse() {
    let a = aggregate(16);
    let b = aggregate(16);
    let state = feed(&a, &ints(&[1]));

    let err = b.update(state, &Value::Int64(2)).expect_err("foreign");
    assert!(err.is_context_misuse());

    let state = feed(&a, &ints(&[1]));
    assert!(b.finalize(state).unwrap_err().is_context_misuse());
}

// ---- failure & teardown ------------------------------------------------

#[test]
fn spill_failure_aborts_the_aggregation() {
    let factory = Arc::new(FailingSortFactory::after_puts(2));
    let agg = aggregate(4).with_sort_factory(factory.clone());

    let state = feed(&agg, &ints(&[1, 2, 3, 4]));
    let err = agg
        .update(state, &Value::Int64(5))
        .expect_err("flush fails");

    assert!(err.is_resource_exhaustion());
    assert_eq!(factory.ended_sessions(), 1);
}

#[test]
fn session_start_failure_for_text_is_resource_exhaustion() {
    let agg = aggregate(16).with_sort_factory(Arc::new(FailingSortFactory::on_begin()));
    let err = agg
        .update(None, &Value::from("x"))
        .expect_err("no session");

    assert!(err.is_resource_exhaustion());
}

#[test]
fn abort_and_drop_release_exactly_once() {
    metrics_reset_all();
    let factory = Arc::new(FailingSortFactory::default());
    let agg = aggregate(1).with_sort_factory(factory.clone());

    let state = feed(&agg, &ints(&[1, 2, 3]));
    assert!(state.as_ref().unwrap().is_spilled());
    agg.abort(state);
    assert_eq!(factory.ended_sessions(), 1);

    let mut state = feed(&agg, &ints(&[1, 2, 3])).unwrap();
    state.release();
    state.release();
    drop(state);
    assert_eq!(factory.ended_sessions(), 2);

    let ops = metrics_report().counters.expect("recorded").ops;
    assert_eq!(ops.aggregates_released, 2);
    assert_eq!(ops.aggregates_aborted, 2);
    assert_eq!(ops.aggregates_finalized, 0);
}

#[test]
fn finalize_releases_the_sort_session() {
    let factory = Arc::new(FailingSortFactory::default());
    let agg = aggregate(2).with_sort_factory(factory.clone());

    let state = feed(&agg, &ints(&[5, 1, 4, 2, 3]));
    assert_eq!(agg.finalize(state).unwrap(), Value::Int64(3));
    assert_eq!(factory.ended_sessions(), 1);
}

// ---- grouped -----------------------------------------------------------

#[test]
fn grouped_median_finalizes_in_key_order() {
    let mut grouped = GroupedMedian::new(aggregate(2));
    for (key, v) in [("b", 10), ("a", 3), ("b", 30), ("a", 1), ("b", 20), ("a", 2)] {
        grouped.update(key, &Value::Int64(v)).unwrap();
    }
    grouped.update("c", &Value::Null).unwrap();

    assert_eq!(grouped.len(), 3);
    assert_eq!(
        grouped.finalize().unwrap(),
        vec![
            ("a", Value::Int64(2)),
            ("b", Value::Int64(20)),
            ("c", Value::Null),
        ]
    );
}

#[test]
fn grouped_failure_drops_only_that_group() {
    let mut grouped = GroupedMedian::new(aggregate(16));
    grouped.update(1, &Value::Int64(5)).unwrap();
    grouped.update(2, &Value::Int64(7)).unwrap();

    assert!(grouped.update(2, &Value::from("oops")).is_err());
    assert_eq!(grouped.finalize().unwrap(), vec![(1, Value::Int64(5))]);
}
