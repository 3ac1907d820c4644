//! Conflict detection between two deltas on the same record
//!
//! Two deltas conflict when some path of one equals, contains, or is
//! contained by some path of the other. Deltas for different records never
//! conflict. The predicate is symmetric.

use crate::record::RecordDelta;
use deltaguard_core::FieldPath;
use serde::{Deserialize, Serialize};

/// How two conflicting paths relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Both deltas change the same path
    Equal,
    /// The left path is an ancestor of the right one
    LeftIsPrefix,
    /// The right path is an ancestor of the left one
    RightIsPrefix,
}

/// One overlapping pair of paths, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathConflict {
    /// Path from the first delta
    pub left: FieldPath,
    /// Path from the second delta
    pub right: FieldPath,
    /// Relationship between them
    pub kind: ConflictKind,
}

impl std::fmt::Display for PathConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let relation = match self.kind {
            ConflictKind::Equal => "==",
            ConflictKind::LeftIsPrefix => "contains",
            ConflictKind::RightIsPrefix => "inside",
        };
        write!(f, "{} {} {}", self.left, relation, self.right)
    }
}

/// Whether `a` and `b` modify overlapping or nested paths of the same record
pub fn deltas_conflict(a: &RecordDelta, b: &RecordDelta) -> bool {
    if a.record_id != b.record_id {
        return false;
    }
    a.modified_paths()
        .any(|left| b.modified_paths().any(|right| left.overlaps(right)))
}

/// Every overlapping path pair between `a` and `b`.
///
/// Empty iff [`deltas_conflict`] is false. Duplicate pairs (several array
/// item operations on one path) are reported once.
pub fn get_conflicting_paths(a: &RecordDelta, b: &RecordDelta) -> Vec<PathConflict> {
    let mut conflicts: Vec<PathConflict> = Vec::new();
    if a.record_id != b.record_id {
        return conflicts;
    }

    for left in a.modified_paths() {
        for right in b.modified_paths() {
            let kind = if left == right {
                ConflictKind::Equal
            } else if left.is_strict_prefix_of(right) {
                ConflictKind::LeftIsPrefix
            } else if right.is_strict_prefix_of(left) {
                ConflictKind::RightIsPrefix
            } else {
                continue;
            };
            let conflict = PathConflict {
                left: left.clone(),
                right: right.clone(),
                kind,
            };
            if !conflicts.contains(&conflict) {
                conflicts.push(conflict);
            }
        }
    }
    conflicts
}
