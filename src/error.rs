//! Unified error type for deltaguard.
//!
//! Each layer has its own error enum; this wraps them so application code
//! can use one `Result` alias and `?` across layers.

use thiserror::Error;

pub use deltaguard_coordinator::{ConfigError, MutationError};
pub use deltaguard_log::LogError;
pub use deltaguard_store::StoreError;

/// All deltaguard errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A mutation did not apply
    #[error("mutation failed: {0}")]
    Mutation(#[from] MutationError),

    /// Coordinator configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The mutation log could not be read or written
    #[error("mutation log error: {0}")]
    Log(#[from] LogError),

    /// The store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for deltaguard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is retryable.
    ///
    /// Conflicts clear once the other mutation resolves; an unavailable
    /// store may come back.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Mutation(e) => e.is_retryable(),
            Error::Store(e) | Error::Log(LogError::Store(e)) => e.is_not_ready(),
            _ => false,
        }
    }

    /// Check if this is a conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Mutation(e) if e.is_conflict())
    }

    /// Check if the store was unavailable.
    pub fn is_not_ready(&self) -> bool {
        match self {
            Error::Mutation(e) => e.is_not_ready(),
            Error::Store(e) | Error::Log(LogError::Store(e)) => e.is_not_ready(),
            _ => false,
        }
    }
}
