//! # deltaguard
//!
//! Field-level change tracking and optimistic concurrency for shared record
//! stores.
//!
//! Several sessions (browser tabs, a background sync worker) may write the
//! same records. deltaguard computes a structural delta for each write,
//! checks it against the other sessions' in-flight writes, records every
//! attempt in a mutation log, and only then applies it to the store.
//!
//! ## Quick Start
//!
//! ```
//! use deltaguard::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> deltaguard::Result<()> {
//!     let store = Arc::new(MemoryStore::new("notes db"));
//!     let coordinator = MutationCoordinator::builder()
//!         .session_id("tab-1")
//!         .relation("notes", ["title", "tags"])
//!         .build(store)?;
//!
//!     coordinator
//!         .insert("notes", "r1", json!({"title": "A", "tags": ["x"]}))
//!         .into_result()?;
//!     let updated = coordinator
//!         .update("notes", "r1", json!({"tags": ["x", "y"]}))
//!         .into_result()?;
//!
//!     let delta = updated.delta.expect("applied mutations carry a delta");
//!     assert_eq!(delta.deltas[0].operation, DeltaOperation::ArrayItemAdded);
//!
//!     let history = coordinator.get_mutation_history("r1", None);
//!     assert_eq!(history.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`types`] - field paths, identifiers, mutation operation and status enums
//! - [`delta`] - deep equality, diff, replay, conflict predicate, merge
//! - [`store`] - the store contract, typed statements, in-memory store
//! - [`log`] - the persisted mutation log
//! - [`coordinator`] - the mutation pipeline

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

/// Field paths, identifiers, and mutation enums
pub use deltaguard_core as types;
/// Structural deltas
pub use deltaguard_delta as delta;
/// Store contract and in-memory store
pub use deltaguard_store as store;
/// Mutation log
pub use deltaguard_log as log;
/// Mutation coordinator
pub use deltaguard_coordinator as coordinator;

// Re-export main entry points
pub use deltaguard_coordinator::{
    CoordinatorBuilder, CoordinatorConfig, MutationCoordinator, MutationRequest, MutationResult,
};
pub use deltaguard_delta::{calculate_delta, RecordDelta};
