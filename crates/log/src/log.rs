//! MutationLog: persisted audit trail
//!
//! ## Design: STATELESS FACADE
//!
//! `MutationLog` holds only a store handle and the relation name. Every
//! call is one or two store queries; nothing is cached, so several
//! coordinators sharing a store see each other's entries.
//!
//! ## Reads
//!
//! A log relation that does not exist yet reads as empty. Rows that fail to
//! decode are skipped with a warning so one corrupt entry cannot hide the
//! rest of a record's history.

use crate::entry::{self, MutationLogEntry};
use crate::error::{LogError, LogResult};
use deltaguard_core::{MutationId, MutationStatus, Timestamp};
use deltaguard_store::{Direction, Ident, PutMode, Query, SelectBuilder, Store, StoreError};
use serde_json::Value;
use tracing::{debug, warn};

/// Relation used when none is configured
pub const DEFAULT_LOG_RELATION: &str = "mutation_log";

/// Mutation log over a shared store
///
/// # Example
///
/// ```
/// use deltaguard_log::MutationLog;
/// use deltaguard_store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::default());
/// let log = MutationLog::new(store).unwrap();
/// assert!(log.pending_for_record("r1").unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct MutationLog<S> {
    store: S,
    relation: Ident,
    columns: Vec<Ident>,
}

impl<S: Store> MutationLog<S> {
    /// Log stored in [`DEFAULT_LOG_RELATION`]
    pub fn new(store: S) -> LogResult<Self> {
        Self::with_relation(store, DEFAULT_LOG_RELATION)
    }

    /// Log stored in `relation`
    pub fn with_relation(store: S, relation: &str) -> LogResult<Self> {
        Ok(MutationLog {
            store,
            relation: Ident::new(relation)?,
            columns: entry::column_idents()?,
        })
    }

    /// Relation holding the entries
    pub fn relation(&self) -> &Ident {
        &self.relation
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist a new entry. Fails if an entry with the same id exists.
    pub fn append(&self, entry: &MutationLogEntry) -> LogResult<()> {
        let query = Query::put(
            self.relation.clone(),
            PutMode::Insert,
            (entry::ident(entry::ID)?, id_value(entry.id)),
            entry.to_columns()?,
        );
        self.store.run_query(&query)?;
        debug!(
            mutation_id = %entry.id,
            record_id = %entry.record_id,
            status = %entry.status,
            "mutation log entry appended"
        );
        Ok(())
    }

    /// `PENDING → APPLIED`, stamping `applied_at`
    pub fn mark_applied(&self, id: MutationId, applied_at: Timestamp) -> LogResult<()> {
        self.mark_status(id, MutationStatus::Applied, Some(applied_at), None)
    }

    /// `PENDING → FAILED`, recording the store error
    pub fn mark_failed(&self, id: MutationId, error: &str) -> LogResult<()> {
        self.mark_status(id, MutationStatus::Failed, None, Some(error))
    }

    /// Move entry `id` to `status`
    ///
    /// The transition must be legal per [`MutationStatus::can_transition_to`].
    /// `applied_at` and `error` are written only when given; other columns
    /// never change.
    pub fn mark_status(
        &self,
        id: MutationId,
        status: MutationStatus,
        applied_at: Option<Timestamp>,
        error: Option<&str>,
    ) -> LogResult<()> {
        let current = self.get(id)?.ok_or(LogError::NotFound(id))?;
        if !current.status.can_transition_to(status) {
            return Err(LogError::IllegalTransition {
                id,
                from: current.status,
                to: status,
            });
        }

        let mut columns = vec![(entry::ident(entry::STATUS)?, Value::from(status.as_str()))];
        if let Some(at) = applied_at {
            columns.push((entry::ident(entry::APPLIED_AT)?, Value::from(at.as_millis())));
        }
        if let Some(message) = error {
            columns.push((entry::ident(entry::ERROR)?, Value::from(message)));
        }

        let query = Query::put(
            self.relation.clone(),
            PutMode::Update,
            (entry::ident(entry::ID)?, id_value(id)),
            columns,
        );
        self.store.run_query(&query)?;
        debug!(mutation_id = %id, from = %current.status, to = %status, "mutation status changed");
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Entry by id
    pub fn get(&self, id: MutationId) -> LogResult<Option<MutationLogEntry>> {
        let query = self
            .select()
            .filter(entry::ident(entry::ID)?, id_value(id))
            .limit(1)
            .build();
        Ok(self.fetch(&query)?.into_iter().next())
    }

    /// `PENDING` entries for `record_id`, oldest first
    pub fn pending_for_record(&self, record_id: &str) -> LogResult<Vec<MutationLogEntry>> {
        let query = self
            .select()
            .filter(entry::ident(entry::RECORD_ID)?, Value::from(record_id))
            .filter(
                entry::ident(entry::STATUS)?,
                Value::from(MutationStatus::Pending.as_str()),
            )
            .order_by(entry::ident(entry::TIMESTAMP)?, Direction::Ascending)
            .build();
        self.fetch(&query)
    }

    /// Entries for `record_id`, newest first, at most `limit`
    pub fn history_for_record(
        &self,
        record_id: &str,
        limit: usize,
    ) -> LogResult<Vec<MutationLogEntry>> {
        let query = self
            .select()
            .filter(entry::ident(entry::RECORD_ID)?, Value::from(record_id))
            .order_by(entry::ident(entry::TIMESTAMP)?, Direction::Descending)
            .limit(limit)
            .build();
        self.fetch(&query)
    }

    /// Entries with `status`, newest first
    pub fn by_status(
        &self,
        status: MutationStatus,
        limit: Option<usize>,
    ) -> LogResult<Vec<MutationLogEntry>> {
        let mut builder = self
            .select()
            .filter(entry::ident(entry::STATUS)?, Value::from(status.as_str()))
            .order_by(entry::ident(entry::TIMESTAMP)?, Direction::Descending);
        if let Some(limit) = limit {
            builder = builder.limit(limit);
        }
        self.fetch(&builder.build())
    }

    /// Most recently applied entry for `record_id`
    pub fn latest_applied(&self, record_id: &str) -> LogResult<Option<MutationLogEntry>> {
        let query = self
            .select()
            .filter(entry::ident(entry::RECORD_ID)?, Value::from(record_id))
            .filter(
                entry::ident(entry::STATUS)?,
                Value::from(MutationStatus::Applied.as_str()),
            )
            .order_by(entry::ident(entry::APPLIED_AT)?, Direction::Descending)
            .limit(1)
            .build();
        Ok(self.fetch(&query)?.into_iter().next())
    }

    fn select(&self) -> SelectBuilder {
        Query::select(self.relation.clone(), self.columns.clone())
    }

    fn fetch(&self, query: &Query) -> LogResult<Vec<MutationLogEntry>> {
        let rows = match self.store.run_query(query) {
            Ok(rows) => rows,
            Err(StoreError::UnknownRelation(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows.objects() {
            match MutationLogEntry::from_row(&row) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    relation = %self.relation,
                    id = ?row.get(entry::ID),
                    error = %e,
                    "skipping undecodable mutation log row"
                ),
            }
        }
        Ok(entries)
    }
}

fn id_value(id: MutationId) -> Value {
    Value::String(id.to_string())
}
