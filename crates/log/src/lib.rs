//! Mutation log for deltaguard
//!
//! Append-only history of every attempted mutation, persisted as one row per
//! [`MutationLogEntry`] in a relation of the shared store. Other sessions'
//! `PENDING` rows are what conflict detection scans.
//!
//! Entries are never deleted here; retention is an external policy. Only
//! `status`, `applied_at` and `error` change after an entry is written.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod log;

pub use entry::MutationLogEntry;
pub use error::{LogError, LogResult};
pub use log::{MutationLog, DEFAULT_LOG_RELATION};
