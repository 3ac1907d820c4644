//! Merging two deltas computed against the same base
//!
//! Non-conflicting deltas touch disjoint subtrees, so applying them in either
//! order yields the same document. Conflicting deltas are not merged; the
//! base is returned unchanged with the overlapping paths.

use crate::apply::apply_delta;
use crate::conflict::{get_conflicting_paths, PathConflict};
use crate::record::RecordDelta;
use serde_json::Value;

/// Result of [`merge_non_conflicting_deltas`]
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Base with both deltas applied, or the untouched base on conflict
    pub merged: Option<Value>,
    /// Overlapping paths; empty when the merge happened
    pub conflicts: Vec<PathConflict>,
}

impl MergeOutcome {
    /// Both deltas were applied
    pub fn is_merged(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Apply `a` then `b` to `base` unless they conflict.
pub fn merge_non_conflicting_deltas(
    base: Option<&Value>,
    a: &RecordDelta,
    b: &RecordDelta,
) -> MergeOutcome {
    let conflicts = get_conflicting_paths(a, b);
    if !conflicts.is_empty() {
        tracing::debug!(
            record_id = %a.record_id,
            conflicts = conflicts.len(),
            "deltas overlap, merge refused"
        );
        return MergeOutcome {
            merged: base.cloned(),
            conflicts,
        };
    }

    let first = apply_delta(base, a);
    MergeOutcome {
        merged: apply_delta(first.as_ref(), b),
        conflicts,
    }
}
