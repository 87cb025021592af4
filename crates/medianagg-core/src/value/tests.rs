use crate::{
    capability::TextMode,
    value::{Value, strict_order_cmp},
};
use medianagg_primitives::{ALL_SCALAR_KINDS, ScalarKind};
use std::cmp::Ordering;

// ---- helpers -----------------------------------------------------------

fn v_txt(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn sample_value_for_kind(kind: ScalarKind) -> Value {
    match kind {
        ScalarKind::Blob => Value::Blob(vec![1, 2, 3]),
        ScalarKind::Bool => Value::Bool(true),
        ScalarKind::Float32 => Value::Float32(1.25),
        ScalarKind::Float64 => Value::Float64(2.5),
        ScalarKind::Int16 => Value::Int16(-3),
        ScalarKind::Int32 => Value::Int32(-5),
        ScalarKind::Int64 => Value::Int64(-7),
        ScalarKind::Text => v_txt("example"),
        ScalarKind::Timestamp => Value::Timestamp(1_700_000_000_000_000),
        ScalarKind::Uint64 => Value::Uint64(7),
    }
}

// ---- kinds -------------------------------------------------------------

#[test]
fn every_kind_has_a_sample_that_reports_it() {
    for kind in ALL_SCALAR_KINDS {
        assert_eq!(sample_value_for_kind(kind).scalar_kind(), Some(kind));
    }
}

#[test]
fn null_has_no_kind() {
    assert_eq!(Value::Null.scalar_kind(), None);
    assert!(Value::Null.is_null());
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(Value::from(Some(4i64)), Value::Int64(4));
}

#[test]
fn lossy_cast_exists_exactly_for_arithmetic_kinds() {
    for kind in ALL_SCALAR_KINDS {
        let value = sample_value_for_kind(kind);
        assert_eq!(
            value.as_f64_lossy().is_some(),
            kind.is_arithmetic(),
            "{kind}"
        );
    }
}

#[test]
fn lossy_cast_widens_narrow_integers_exactly() {
    assert_eq!(Value::Int16(i16::MIN).as_f64_lossy(), Some(-32768.0));
    assert_eq!(Value::Int32(i32::MAX).as_f64_lossy(), Some(2_147_483_647.0));
    assert_eq!(Value::Float32(0.5).as_f64_lossy(), Some(0.5));
}

// ---- ordering ----------------------------------------------------------

#[test]
fn strict_cmp_rejects_mismatched_variants() {
    assert_eq!(
        strict_order_cmp(&Value::Int64(1), &Value::Int32(1), TextMode::Cs),
        None
    );
    assert_eq!(
        strict_order_cmp(&Value::Blob(vec![1]), &Value::Blob(vec![1]), TextMode::Cs),
        None
    );
}

#[test]
fn strict_cmp_orders_floats_totally() {
    let cmp = |a: f64, b: f64| {
        strict_order_cmp(&Value::Float64(a), &Value::Float64(b), TextMode::Cs)
    };

    assert_eq!(cmp(-0.0, 0.0), Some(Ordering::Less));
    assert_eq!(cmp(f64::NAN, f64::INFINITY), Some(Ordering::Greater));
    assert_eq!(cmp(f64::NAN, f64::NAN), Some(Ordering::Equal));
    assert_eq!(cmp(1.5, 1.5), Some(Ordering::Equal));
}

#[test]
fn case_insensitive_text_groups_by_folded_form() {
    let mut words = vec![v_txt("banana"), v_txt("Apple"), v_txt("apple"), v_txt("Cherry")];
    words.sort_by(|a, b| strict_order_cmp(a, b, TextMode::Ci).unwrap());

    assert_eq!(
        words,
        vec![v_txt("Apple"), v_txt("apple"), v_txt("banana"), v_txt("Cherry")]
    );
}

#[test]
fn case_sensitive_text_uses_binary_order() {
    assert_eq!(
        strict_order_cmp(&v_txt("Zebra"), &v_txt("apple"), TextMode::Cs),
        Some(Ordering::Less)
    );
    assert_eq!(
        strict_order_cmp(&v_txt("Zebra"), &v_txt("apple"), TextMode::Ci),
        Some(Ordering::Greater)
    );
}
