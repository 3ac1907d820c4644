//! Generated-document properties
//!
//! Arrays are diffed as multisets, so replay reproduces array contents but
//! not necessarily their order. Comparisons normalize arrays first.

use crate::common::*;
use deltaguard::delta::get_conflicting_paths;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-5i64..5).prop_map(Value::from),
        "[a-c]{0,2}".prop_map(Value::from),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn record() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", value(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// A record and two independent edits of it
fn base_and_edits() -> impl Strategy<Value = (Value, Value, Value)> {
    record().prop_flat_map(|base| (Just(base.clone()), edit_of(base.clone()), edit_of(base)))
}

/// `base` with some top-level keys replaced, removed, or added
fn edit_of(base: Value) -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-f]", prop::option::of(value())), 0..3).prop_map(move |changes| {
        let mut doc = base.clone();
        if let Value::Object(map) = &mut doc {
            for (key, change) in changes {
                match change {
                    Some(v) => {
                        map.insert(key, v);
                    }
                    None => {
                        map.remove(&key);
                    }
                }
            }
        }
        doc
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// Sort every array by the canonical text of its normalized elements
fn normalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut items: Vec<Value> = items.iter().map(normalize).collect();
            items.sort_by_key(|v| v.to_string());
            Value::Array(items)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn normalized(value: Option<Value>) -> Option<Value> {
    value.as_ref().map(normalize)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn round_trip_reproduces_target(a in value(), b in value()) {
        let delta = calculate_delta("r1", NOTES, Some(&a), Some(&b));
        let replayed = apply_delta(Some(&a), &delta);
        prop_assert_eq!(normalized(replayed), Some(normalize(&b)));
    }

    #[test]
    fn round_trip_between_records(a in record(), b in record()) {
        let delta = calculate_delta("r1", NOTES, Some(&a), Some(&b));
        let replayed = apply_delta(Some(&a), &delta);
        prop_assert_eq!(normalized(replayed), Some(normalize(&b)));
    }

    #[test]
    fn round_trip_from_and_to_absent(a in value()) {
        let created = calculate_delta("r1", NOTES, None, Some(&a));
        prop_assert_eq!(apply_delta(None, &created), Some(a.clone()));

        let deleted = calculate_delta("r1", NOTES, Some(&a), None);
        prop_assert_eq!(apply_delta(Some(&a), &deleted), None);
    }

    #[test]
    fn identical_snapshots_have_no_delta(a in value()) {
        let delta = calculate_delta("r1", NOTES, Some(&a), Some(&a.clone()));
        prop_assert!(delta.deltas.is_empty());
    }

    #[test]
    fn empty_delta_iff_equal(a in value(), b in value()) {
        let delta = calculate_delta("r1", NOTES, Some(&a), Some(&b));
        prop_assert_eq!(delta.is_empty(), deltaguard::delta::deep_equal(&a, &b));
    }

    #[test]
    fn conflict_is_symmetric((base, x, y) in base_and_edits()) {
        let a = calculate_delta("r1", NOTES, Some(&base), Some(&x));
        let b = calculate_delta("r1", NOTES, Some(&base), Some(&y));
        prop_assert_eq!(deltas_conflict(&a, &b), deltas_conflict(&b, &a));
        prop_assert_eq!(
            get_conflicting_paths(&a, &b).is_empty(),
            !deltas_conflict(&a, &b)
        );
    }

    #[test]
    fn different_records_never_conflict(a in record(), b in record(), c in record()) {
        let left = calculate_delta("r1", NOTES, Some(&a), Some(&b));
        let right = calculate_delta("r2", NOTES, Some(&a), Some(&c));
        prop_assert!(!deltas_conflict(&left, &right));
    }

    #[test]
    fn disjoint_deltas_commute((base, x, y) in base_and_edits()) {
        let a = calculate_delta("r1", NOTES, Some(&base), Some(&x));
        let b = calculate_delta("r1", NOTES, Some(&base), Some(&y));
        prop_assume!(!deltas_conflict(&a, &b));

        let ab = apply_delta(apply_delta(Some(&base), &a).as_ref(), &b);
        let ba = apply_delta(apply_delta(Some(&base), &b).as_ref(), &a);
        prop_assert_eq!(normalized(ab), normalized(ba));
    }

    #[test]
    fn merge_is_gated_on_conflict((base, x, y) in base_and_edits()) {
        let a = calculate_delta("r1", NOTES, Some(&base), Some(&x));
        let b = calculate_delta("r1", NOTES, Some(&base), Some(&y));
        let outcome = merge_non_conflicting_deltas(Some(&base), &a, &b);

        if deltas_conflict(&a, &b) {
            prop_assert!(!outcome.conflicts.is_empty());
            prop_assert_eq!(outcome.merged, Some(base.clone()));
        } else {
            prop_assert!(outcome.conflicts.is_empty());
            let ba = apply_delta(apply_delta(Some(&base), &b).as_ref(), &a);
            prop_assert_eq!(normalized(outcome.merged), normalized(ba));
        }
    }

    #[test]
    fn delta_survives_serialization(a in record(), b in record()) {
        let delta = calculate_delta("r1", NOTES, Some(&a), Some(&b));
        let text = serde_json::to_string(&delta).unwrap();
        let back: RecordDelta = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(back, delta);
    }
}
