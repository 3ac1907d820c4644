//! Convenient imports for deltaguard.
//!
//! ```
//! use deltaguard::prelude::*;
//! use std::sync::Arc;
//!
//! let coordinator = MutationCoordinator::builder()
//!     .relation("notes", ["title"])
//!     .build(Arc::new(MemoryStore::default()))
//!     .unwrap();
//! assert!(coordinator.insert("notes", "r1", json!({"title": "A"})).success);
//! ```

// Coordinator
pub use crate::coordinator::{
    CoordinatorBuilder, CoordinatorConfig, MutationCoordinator, MutationRequest, MutationResult,
};

// Error handling
pub use crate::error::{Error, MutationError, Result};

// Deltas
pub use crate::delta::{
    apply_delta, calculate_delta, deltas_conflict, merge_non_conflicting_deltas, DeltaOperation,
    FieldDelta, RecordDelta,
};

// Store
pub use crate::store::{MemoryStore, Schema, Store};

// Core types
pub use crate::types::{FieldPath, MutationId, MutationOperation, MutationStatus, SessionId, UserId};

// Re-export serde_json for convenience
pub use serde_json::{json, Value};
