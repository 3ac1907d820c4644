//! Core types for deltaguard
//!
//! This crate defines the vocabulary shared by every other layer:
//! - [`FieldPath`]: location of a value inside a nested record
//! - [`MutationId`], [`SessionId`], [`UserId`]: actor and entry identity
//! - [`Timestamp`]: millisecond wall-clock time used for ordering and versions
//! - [`MutationOperation`], [`MutationStatus`]: the write intents and the
//!   lifecycle state machine of a logged mutation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod mutation;
pub mod path;
pub mod types;

pub use error::ParseError;
pub use mutation::{MutationOperation, MutationStatus};
pub use path::FieldPath;
pub use types::{MutationId, SessionId, Timestamp, UserId};
