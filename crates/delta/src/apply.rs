//! Delta replay
//!
//! [`apply_delta`] clones the base and replays the field operations in order.
//! Replay never fails: operations whose target is missing or has the wrong
//! shape are skipped.
//!
//! Field operations only navigate objects. When the base is not an object
//! (absent record, scalar, array) the delta is resolved as a whole: a single
//! root operation is applied directly, otherwise the after snapshot is used.

use crate::equality::deep_equal;
use crate::record::{DeltaOperation, FieldDelta, RecordDelta};
use serde_json::{Map, Value};

/// Replay `delta` onto `base`, returning the new snapshot.
///
/// `None` on either side means the record is absent.
///
/// # Example
///
/// ```
/// use deltaguard_delta::{apply_delta, calculate_delta};
/// use serde_json::json;
///
/// let a = json!({"title": "A", "body": "x"});
/// let b = json!({"title": "B", "body": "x"});
/// let delta = calculate_delta("r1", "notes", Some(&a), Some(&b));
///
/// assert_eq!(apply_delta(Some(&a), &delta), Some(b));
/// ```
pub fn apply_delta(base: Option<&Value>, delta: &RecordDelta) -> Option<Value> {
    if delta.deltas.is_empty() {
        return base.cloned();
    }

    match base {
        Some(Value::Object(_)) => {
            let mut doc = base.cloned();
            for field in &delta.deltas {
                apply_field(&mut doc, field);
            }
            doc
        }
        _ => whole_record(delta),
    }
}

fn whole_record(delta: &RecordDelta) -> Option<Value> {
    match delta.deltas.as_slice() {
        [only] if only.path.is_root() && only.operation != DeltaOperation::ArrayItemAdded
            && only.operation != DeltaOperation::ArrayItemRemoved =>
        {
            if only.operation == DeltaOperation::FieldRemoved {
                None
            } else {
                only.new_value.clone()
            }
        }
        _ => delta.after_snapshot.clone(),
    }
}

fn apply_field(doc: &mut Option<Value>, field: &FieldDelta) {
    let Some((parent, key)) = field.path.split_last() else {
        apply_root(doc, field);
        return;
    };

    let root = doc.get_or_insert_with(|| Value::Object(Map::new()));

    match field.operation {
        op if op.replaces_value() => {
            if let Some(value) = &field.new_value {
                if let Some(container) = object_at_mut(root, parent, true) {
                    container.insert(key.to_string(), value.clone());
                }
            }
        }
        DeltaOperation::FieldRemoved => {
            if let Some(container) = object_at_mut(root, parent, false) {
                container.remove(key);
            }
        }
        DeltaOperation::ArrayItemAdded => {
            let Some(item) = &field.new_value else { return };
            let Some(container) = object_at_mut(root, parent, true) else {
                return;
            };
            match container.get_mut(key) {
                Some(Value::Array(items)) => items.push(item.clone()),
                None => {
                    container.insert(key.to_string(), Value::Array(vec![item.clone()]));
                }
                Some(_) => {
                    tracing::trace!(path = %field.path, "array append onto non-array skipped");
                }
            }
        }
        DeltaOperation::ArrayItemRemoved => {
            let Some(item) = &field.old_value else { return };
            if let Some(Value::Array(items)) =
                object_at_mut(root, parent, false).and_then(|c| c.get_mut(key))
            {
                remove_first_match(items, item);
            }
        }
        _ => {}
    }
}

fn apply_root(doc: &mut Option<Value>, field: &FieldDelta) {
    match field.operation {
        DeltaOperation::FieldRemoved => *doc = None,
        DeltaOperation::ArrayItemAdded => {
            if let (Some(Value::Array(items)), Some(item)) = (doc.as_mut(), &field.new_value) {
                items.push(item.clone());
            }
        }
        DeltaOperation::ArrayItemRemoved => {
            if let (Some(Value::Array(items)), Some(item)) = (doc.as_mut(), &field.old_value) {
                remove_first_match(items, item);
            }
        }
        _ => {
            if let Some(value) = &field.new_value {
                *doc = Some(value.clone());
            }
        }
    }
}

/// Walk `segments` through nested objects. With `create`, missing or
/// non-object intermediates are replaced by empty objects.
fn object_at_mut<'a>(
    root: &'a mut Value,
    segments: &[String],
    create: bool,
) -> Option<&'a mut Map<String, Value>> {
    if create && !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let mut current = root.as_object_mut()?;
    for segment in segments {
        if create {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut()?;
        } else {
            current = current.get_mut(segment)?.as_object_mut()?;
        }
    }
    Some(current)
}

fn remove_first_match(items: &mut Vec<Value>, item: &Value) {
    if let Some(index) = items.iter().position(|candidate| deep_equal(candidate, item)) {
        items.remove(index);
    }
}
