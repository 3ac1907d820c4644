//! Mutation operations and the log-entry lifecycle
//!
//! ## Lifecycle
//!
//! ```text
//!            ┌──────────► APPLIED ──────► REVERTED
//!            │
//! PENDING ───┼──────────► CONFLICTED
//!            │
//!            └──────────► FAILED
//! ```
//!
//! `CONFLICTED` entries are normally written directly in that state, since a
//! conflicted mutation never reaches the store. `REVERTED` is only produced
//! by external rollback tooling.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of write a mutation request intends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationOperation {
    /// Create a record that must not exist yet
    Insert,
    /// Change a record that must exist
    Update,
    /// Remove a record
    Delete,
    /// Create or replace
    Upsert,
}

impl MutationOperation {
    /// All operations (for iteration)
    pub const ALL: [MutationOperation; 4] = [
        MutationOperation::Insert,
        MutationOperation::Update,
        MutationOperation::Delete,
        MutationOperation::Upsert,
    ];

    /// Persisted name
    pub const fn as_str(&self) -> &'static str {
        match self {
            MutationOperation::Insert => "INSERT",
            MutationOperation::Update => "UPDATE",
            MutationOperation::Delete => "DELETE",
            MutationOperation::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for MutationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationOperation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "mutation operation",
                value: s.to_string(),
            })
    }
}

/// Status of a mutation log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationStatus {
    /// Logged, not yet resolved. Other sessions treat it as in flight.
    Pending,
    /// Written to the store
    Applied,
    /// Rejected because it overlapped another pending mutation
    Conflicted,
    /// The store write failed
    Failed,
    /// Rolled back after being applied
    Reverted,
}

impl MutationStatus {
    /// All statuses (for iteration)
    pub const ALL: [MutationStatus; 5] = [
        MutationStatus::Pending,
        MutationStatus::Applied,
        MutationStatus::Conflicted,
        MutationStatus::Failed,
        MutationStatus::Reverted,
    ];

    /// Persisted name
    pub const fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "PENDING",
            MutationStatus::Applied => "APPLIED",
            MutationStatus::Conflicted => "CONFLICTED",
            MutationStatus::Failed => "FAILED",
            MutationStatus::Reverted => "REVERTED",
        }
    }

    /// Still in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationStatus::Pending)
    }

    /// No further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MutationStatus::Conflicted | MutationStatus::Failed | MutationStatus::Reverted
        )
    }

    /// Whether an entry in `self` may move to `next`
    pub fn can_transition_to(&self, next: MutationStatus) -> bool {
        use MutationStatus::*;
        matches!(
            (self, next),
            (Pending, Applied) | (Pending, Conflicted) | (Pending, Failed) | (Applied, Reverted)
        )
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::UnknownVariant {
                kind: "mutation status",
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
