//! Delta value types
//!
//! [`FieldDelta`] is one atomic change at a path. [`RecordDelta`] is the full
//! ordered diff for one record plus both snapshots, kept for audit and for
//! replay onto bases the field operations cannot express.
//!
//! Both are immutable once computed.

use deltaguard_core::{FieldPath, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Kind of change a [`FieldDelta`] records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaOperation {
    /// Value appeared where there was none. Carries only `new_value`.
    FieldAdded,
    /// Value disappeared. Carries only `old_value`.
    FieldRemoved,
    /// Nested value changed (scalar change or type mismatch below the root)
    FieldModified,
    /// One element joined an array (multiset membership, not position)
    ArrayItemAdded,
    /// One element left an array
    ArrayItemRemoved,
    /// Same elements, different order or duplicate counts. Carries both arrays.
    ArrayReordered,
    /// The whole record changed type
    ObjectReplaced,
}

impl DeltaOperation {
    /// Persisted name
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeltaOperation::FieldAdded => "FIELD_ADDED",
            DeltaOperation::FieldRemoved => "FIELD_REMOVED",
            DeltaOperation::FieldModified => "FIELD_MODIFIED",
            DeltaOperation::ArrayItemAdded => "ARRAY_ITEM_ADDED",
            DeltaOperation::ArrayItemRemoved => "ARRAY_ITEM_REMOVED",
            DeltaOperation::ArrayReordered => "ARRAY_REORDERED",
            DeltaOperation::ObjectReplaced => "OBJECT_REPLACED",
        }
    }

    /// Operations that overwrite whatever is at the path
    pub fn replaces_value(&self) -> bool {
        matches!(
            self,
            DeltaOperation::FieldAdded
                | DeltaOperation::FieldModified
                | DeltaOperation::ArrayReordered
                | DeltaOperation::ObjectReplaced
        )
    }
}

impl std::fmt::Display for DeltaOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic change at `path`.
///
/// `old_value` / `new_value` distinguish "absent" (`None`) from JSON `null`
/// (`Some(Value::Null)`), including after a serde round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDelta {
    /// Location from the record root
    pub path: FieldPath,
    /// What happened there
    pub operation: DeltaOperation,
    /// Value before the change
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub old_value: Option<Value>,
    /// Value after the change
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub new_value: Option<Value>,
}

impl FieldDelta {
    /// `FIELD_ADDED` at `path`
    pub fn added(path: FieldPath, new_value: Value) -> Self {
        Self::new(path, DeltaOperation::FieldAdded, None, Some(new_value))
    }

    /// `FIELD_REMOVED` at `path`
    pub fn removed(path: FieldPath, old_value: Value) -> Self {
        Self::new(path, DeltaOperation::FieldRemoved, Some(old_value), None)
    }

    /// `FIELD_MODIFIED` at `path`
    pub fn modified(path: FieldPath, old_value: Value, new_value: Value) -> Self {
        Self::new(
            path,
            DeltaOperation::FieldModified,
            Some(old_value),
            Some(new_value),
        )
    }

    /// `ARRAY_ITEM_ADDED` at `path`
    pub fn array_item_added(path: FieldPath, item: Value) -> Self {
        Self::new(path, DeltaOperation::ArrayItemAdded, None, Some(item))
    }

    /// `ARRAY_ITEM_REMOVED` at `path`
    pub fn array_item_removed(path: FieldPath, item: Value) -> Self {
        Self::new(path, DeltaOperation::ArrayItemRemoved, Some(item), None)
    }

    /// `ARRAY_REORDERED` at `path`
    pub fn array_reordered(path: FieldPath, old_value: Value, new_value: Value) -> Self {
        Self::new(
            path,
            DeltaOperation::ArrayReordered,
            Some(old_value),
            Some(new_value),
        )
    }

    /// `OBJECT_REPLACED` at `path`
    pub fn object_replaced(path: FieldPath, old_value: Value, new_value: Value) -> Self {
        Self::new(
            path,
            DeltaOperation::ObjectReplaced,
            Some(old_value),
            Some(new_value),
        )
    }

    fn new(
        path: FieldPath,
        operation: DeltaOperation,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        FieldDelta {
            path,
            operation,
            old_value,
            new_value,
        }
    }
}

/// The complete diff for one record mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDelta {
    /// Record the delta belongs to
    pub record_id: String,
    /// Relation (table) holding the record
    pub relation: String,
    /// When the delta was computed
    pub timestamp: Timestamp,
    /// Field operations, in replay order
    pub deltas: Vec<FieldDelta>,
    /// Full state before (`None`: record absent)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub before_snapshot: Option<Value>,
    /// Full state after (`None`: record absent)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub after_snapshot: Option<Value>,
}

impl RecordDelta {
    /// No field changed
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Paths touched by this delta, in delta order (may repeat for array items)
    pub fn modified_paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.deltas.iter().map(|d| &d.path)
    }

    /// Whether any change lands on, above, or below `path`
    pub fn touches(&self, path: &FieldPath) -> bool {
        self.modified_paths().any(|p| p.overlaps(path))
    }
}

// Field present in the input (even as `null`) deserializes to `Some`.
// Missing fields fall back to `None` via `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
