//! Store layer for deltaguard
//!
//! The record store itself is an external collaborator. This crate defines
//! the narrow contract deltaguard consumes and the pieces needed to speak it
//! safely:
//! - [`Store`]: "is the store ready" and "run this query, give me rows"
//! - [`Query`] / [`Statement`]: typed statements with bound parameters;
//!   relation and column names pass through [`Ident`], values never reach
//!   query text
//! - [`Schema`]: static map from relation name to its ordered field list
//! - [`MemoryStore`]: in-process implementation for embedding and tests

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ident;
pub mod memory;
pub mod query;
pub mod schema;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use ident::Ident;
pub use memory::MemoryStore;
pub use query::{Direction, Put, PutMode, Query, Remove, Select, SelectBuilder, Statement};
pub use schema::{RelationSchema, Schema};
pub use traits::{Rows, Store};
