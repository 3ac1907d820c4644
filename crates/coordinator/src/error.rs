//! Coordinator error types
//!
//! [`MutationError`] is never returned as `Err` from the public entry points.
//! It travels inside [`MutationResult`](crate::MutationResult) so callers
//! always get an outcome object.

use deltaguard_core::MutationId;
use std::path::PathBuf;
use thiserror::Error;

/// Why a mutation did not apply
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// The store was unavailable; nothing was logged
    #[error("{store} not ready")]
    NotReady {
        /// Store name
        store: String,
    },

    /// Another in-flight mutation overlaps this one; the store was not touched
    #[error("Concurrent modification detected")]
    Conflict {
        /// Log entries this mutation collided with
        conflicts: Vec<MutationId>,
    },

    /// The store rejected the write
    #[error("{message}")]
    ApplyFailure {
        /// Underlying store message
        message: String,
    },
}

impl MutationError {
    /// Check if this is a conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MutationError::Conflict { .. })
    }

    /// Check if retrying may succeed.
    ///
    /// Conflicts clear once the other mutation resolves; an unavailable store
    /// may come back.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MutationError::Conflict { .. } | MutationError::NotReady { .. }
        )
    }

    /// Check if the store was unavailable.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, MutationError::NotReady { .. })
    }
}

/// Invalid coordinator configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid TOML for [`CoordinatorConfig`](crate::CoordinatorConfig)
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A relation, column, or log relation name is not a valid identifier
    #[error("invalid identifier in configuration: {0}")]
    InvalidIdentifier(String),
}
