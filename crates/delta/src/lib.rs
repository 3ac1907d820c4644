//! Delta layer for deltaguard
//!
//! This crate turns two snapshots of one record into an ordered list of
//! field-level changes, and back:
//! - [`deep_equal`]: structural value comparison
//! - [`calculate_delta`]: recursive diff producing a [`RecordDelta`]
//! - [`apply_delta`]: replay a delta onto a base snapshot
//! - [`deltas_conflict`] / [`get_conflicting_paths`]: overlap detection
//! - [`merge_non_conflicting_deltas`]: combine two disjoint deltas
//!
//! Nothing here touches storage. Snapshots are `Option<Value>`, where `None`
//! means the record does not exist.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod apply;
pub mod conflict;
pub mod diff;
pub mod equality;
pub mod merge;
pub mod record;

pub use apply::apply_delta;
pub use conflict::{deltas_conflict, get_conflicting_paths, ConflictKind, PathConflict};
pub use diff::{calculate_delta, compute_deltas};
pub use equality::deep_equal;
pub use merge::{merge_non_conflicting_deltas, MergeOutcome};
pub use record::{DeltaOperation, FieldDelta, RecordDelta};

pub use serde_json::Value;
