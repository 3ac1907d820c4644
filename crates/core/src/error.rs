//! Parse errors for core enumerations and identifiers

use thiserror::Error;

/// Failure to parse a core type from its persisted string form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The string does not name any variant of the target enum
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// Name of the type being parsed
        kind: &'static str,
        /// Offending input
        value: String,
    },

    /// The string is not a valid mutation id
    #[error("invalid mutation id {value:?}: {reason}")]
    InvalidId {
        /// Offending input
        value: String,
        /// Underlying parser message
        reason: String,
    },
}
