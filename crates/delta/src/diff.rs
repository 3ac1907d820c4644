//! Recursive record diff
//!
//! ## Rules (applied in order at each path)
//!
//! 1. absent → present: `FIELD_ADDED`, no recursion
//! 2. present → absent: `FIELD_REMOVED`, no recursion
//! 3. deep-equal: nothing
//! 4. both arrays: one `ARRAY_ITEM_ADDED` / `ARRAY_ITEM_REMOVED` per unmatched
//!    element (multiset matching by deep equality). If every element matched
//!    but the arrays still differ, a single `ARRAY_REORDERED`. Elements are
//!    never diffed internally.
//! 5. both objects: recurse over the union of keys
//! 6. anything else: `OBJECT_REPLACED` at the root, `FIELD_MODIFIED` below it
//!
//! Invariant: the result is empty iff the two snapshots are deep-equal.

use crate::equality::{deep_equal, snapshots_equal};
use crate::record::{FieldDelta, RecordDelta};
use deltaguard_core::{FieldPath, Timestamp};
use serde_json::{Map, Value};

/// Diff two snapshots of one record.
///
/// Never fails. `None` means the record is absent on that side.
///
/// # Example
///
/// ```
/// use deltaguard_delta::{calculate_delta, DeltaOperation};
/// use serde_json::json;
///
/// let before = json!({"title": "A", "tags": ["x"]});
/// let after = json!({"title": "B", "tags": ["x", "y"]});
/// let delta = calculate_delta("r1", "notes", Some(&before), Some(&after));
///
/// assert_eq!(delta.deltas.len(), 2);
/// assert!(delta.deltas.iter().any(|d| d.operation == DeltaOperation::ArrayItemAdded));
/// ```
pub fn calculate_delta(
    record_id: impl Into<String>,
    relation: impl Into<String>,
    before: Option<&Value>,
    after: Option<&Value>,
) -> RecordDelta {
    let mut deltas = Vec::new();
    compute_deltas(before, after, &FieldPath::root(), &mut deltas);

    debug_assert_eq!(deltas.is_empty(), snapshots_equal(before, after));

    RecordDelta {
        record_id: record_id.into(),
        relation: relation.into(),
        timestamp: Timestamp::now(),
        deltas,
        before_snapshot: before.cloned(),
        after_snapshot: after.cloned(),
    }
}

/// Append the field operations turning `before` into `after` at `path` to `out`.
pub fn compute_deltas(
    before: Option<&Value>,
    after: Option<&Value>,
    path: &FieldPath,
    out: &mut Vec<FieldDelta>,
) {
    let (before, after) = match (before, after) {
        (None, None) => return,
        (None, Some(after)) => {
            out.push(FieldDelta::added(path.clone(), after.clone()));
            return;
        }
        (Some(before), None) => {
            out.push(FieldDelta::removed(path.clone(), before.clone()));
            return;
        }
        (Some(before), Some(after)) => (before, after),
    };

    if deep_equal(before, after) {
        return;
    }

    match (before, after) {
        (Value::Array(old), Value::Array(new)) => diff_arrays(old, new, path, out),
        (Value::Object(old), Value::Object(new)) => diff_objects(old, new, path, out),
        _ if path.is_root() => {
            out.push(FieldDelta::object_replaced(
                path.clone(),
                before.clone(),
                after.clone(),
            ));
        }
        _ => {
            out.push(FieldDelta::modified(
                path.clone(),
                before.clone(),
                after.clone(),
            ));
        }
    }
}

fn diff_objects(
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    path: &FieldPath,
    out: &mut Vec<FieldDelta>,
) {
    let keys = old
        .keys()
        .chain(new.keys().filter(|k| !old.contains_key(*k)));

    for key in keys {
        compute_deltas(old.get(key), new.get(key), &path.child(key.as_str()), out);
    }
}

fn diff_arrays(old: &[Value], new: &[Value], path: &FieldPath, out: &mut Vec<FieldDelta>) {
    // Each element of `old` can satisfy at most one element of `new`
    let mut unmatched: Vec<Option<&Value>> = old.iter().map(Some).collect();
    let mut added = Vec::new();

    for item in new {
        let slot = unmatched
            .iter_mut()
            .find(|slot| slot.map_or(false, |candidate| deep_equal(candidate, item)));
        match slot {
            Some(slot) => *slot = None,
            None => added.push(item),
        }
    }

    let removed: Vec<&Value> = unmatched.into_iter().flatten().collect();

    if added.is_empty() && removed.is_empty() {
        out.push(FieldDelta::array_reordered(
            path.clone(),
            Value::Array(old.to_vec()),
            Value::Array(new.to_vec()),
        ));
        return;
    }

    for item in removed {
        out.push(FieldDelta::array_item_removed(path.clone(), item.clone()));
    }
    for item in added {
        out.push(FieldDelta::array_item_added(path.clone(), item.clone()));
    }
}
