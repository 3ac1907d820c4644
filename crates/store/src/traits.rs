//! The store contract
//!
//! Implemented by whatever owns the real persistence engine. deltaguard only
//! asks two things of it: whether it is ready, and to run one query.

use crate::error::StoreResult;
use crate::query::Query;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Result rows of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// Column names, in row order
    pub headers: Vec<String>,
    /// Row values, each aligned with `headers`
    pub rows: Vec<Vec<Value>>,
}

impl Rows {
    /// Rows with the given headers
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Rows { headers, rows }
    }

    /// Result of a write: no columns, no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row `index` as an object keyed by header
    pub fn object(&self, index: usize) -> Option<Map<String, Value>> {
        self.rows.get(index).map(|row| self.zip(row))
    }

    /// Every row as an object keyed by header
    pub fn objects(&self) -> impl Iterator<Item = Map<String, Value>> + '_ {
        self.rows.iter().map(move |row| self.zip(row))
    }

    fn zip(&self, row: &[Value]) -> Map<String, Value> {
        self.headers
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect()
    }
}

/// A queryable record store shared with other sessions
///
/// # Contract
///
/// - `run_query` either executes the whole statement or fails with a
///   [`StoreError`](crate::StoreError); partial writes are the engine's concern.
/// - Implementations must be safe to share across threads. deltaguard never
///   holds an exclusive lock on the store.
/// - Timeouts are the implementation's responsibility.
pub trait Store: Send + Sync {
    /// Human-readable name used in "not ready" errors
    fn name(&self) -> &str;

    /// Whether the connection is initialized
    fn is_ready(&self) -> bool;

    /// Execute one query
    fn run_query(&self, query: &Query) -> StoreResult<Rows>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn run_query(&self, query: &Query) -> StoreResult<Rows> {
        (**self).run_query(query)
    }
}

impl<S: Store + ?Sized> Store for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn run_query(&self, query: &Query) -> StoreResult<Rows> {
        (**self).run_query(query)
    }
}
