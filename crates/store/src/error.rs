//! Store error types

use thiserror::Error;

/// Errors reported by a [`Store`](crate::Store) or while building statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store connection is not initialized
    #[error("{store} not ready")]
    NotReady {
        /// Store name
        store: String,
    },

    /// The relation does not exist
    #[error("unknown relation: {0}")]
    UnknownRelation(String),

    /// A write violated a key constraint (duplicate insert, update of a missing row)
    #[error("constraint violation on {relation}: {message}")]
    ConstraintViolation {
        /// Relation written to
        relation: String,
        /// What went wrong
        message: String,
    },

    /// The engine rejected or failed the query
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A relation or column name is not a valid identifier
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Row data for a put is not an object of column values
    #[error("invalid row for {relation}: {message}")]
    InvalidRow {
        /// Relation written to
        relation: String,
        /// What went wrong
        message: String,
    },
}

impl StoreError {
    /// Check if this is a not-ready error
    pub fn is_not_ready(&self) -> bool {
        matches!(self, StoreError::NotReady { .. })
    }

    /// Check if this is an unknown-relation error
    pub fn is_unknown_relation(&self) -> bool {
        matches!(self, StoreError::UnknownRelation(_))
    }
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
