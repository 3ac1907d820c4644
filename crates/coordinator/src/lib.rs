//! Mutation coordinator for deltaguard
//!
//! Every write to a shared record store goes through a
//! [`MutationCoordinator`] bound to one session. The coordinator diffs the
//! write against the record's current state, checks the delta against other
//! sessions' in-flight mutations, logs the attempt, and only then touches the
//! store.
//!
//! Entry points never return `Err`: the outcome of each attempt is a
//! [`MutationResult`], with a typed [`MutationError`] when it did not apply.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod apply;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod request;
pub mod result;

pub use config::{CoordinatorConfig, DEFAULT_HISTORY_LIMIT};
pub use coordinator::{CoordinatorBuilder, MutationCoordinator};
pub use error::{ConfigError, MutationError};
pub use request::MutationRequest;
pub use result::{MutationResult, FAILED_VERSION};
