//! Mutation log errors

use deltaguard_core::{MutationId, MutationStatus};
use deltaguard_store::StoreError;
use thiserror::Error;

/// Errors from reading or writing the mutation log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogError {
    /// The underlying store failed
    #[error("mutation log store error: {0}")]
    Store(#[from] StoreError),

    /// A value could not be encoded as JSON text
    #[error("mutation log serialization error: {0}")]
    Serialization(String),

    /// A persisted row could not be decoded
    #[error("malformed mutation log row, column {column}: {reason}")]
    MalformedRow {
        /// Column that failed to decode
        column: &'static str,
        /// Why
        reason: String,
    },

    /// No entry with this id
    #[error("mutation log entry {0} not found")]
    NotFound(MutationId),

    /// The status change is not allowed by the lifecycle
    #[error("illegal status transition for {id}: {from} -> {to}")]
    IllegalTransition {
        /// Entry id
        id: MutationId,
        /// Current status
        from: MutationStatus,
        /// Requested status
        to: MutationStatus,
    },
}

impl From<serde_json::Error> for LogError {
    fn from(e: serde_json::Error) -> Self {
        LogError::Serialization(e.to_string())
    }
}

/// Result type for mutation log operations
pub type LogResult<T> = std::result::Result<T, LogError>;
