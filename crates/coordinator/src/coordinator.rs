//! Mutation coordinator
//!
//! Runs every write through the same pipeline:
//!
//! ```text
//! 1. store ready?            no  -> NotReady, nothing logged
//! 2. fetch current state     error -> treated as absent
//! 3. calculate_delta(current, resulting state)
//!    write not buildable    -> FAILED entry, ApplyFailure, store untouched
//! 4. scan PENDING log entries for the record; deltas_conflict against each
//!    (plus the stale base_version check when enabled)
//! 5. conflicts?              yes -> CONFLICTED entry, store untouched
//! 6. PENDING entry, write to store, mark APPLIED (version = applied_at)
//! 7. store write failed      -> mark FAILED, ApplyFailure
//! ```
//!
//! ## Thread Safety
//!
//! Steps 2 through 7 run under an internal queue lock, so mutations issued
//! through one coordinator never interleave. Across coordinators (other
//! processes, other sessions) the only protection is the pending-entry scan,
//! which is optimistic: two coordinators can both pass step 4 before either
//! writes its entry.
//!
//! ## Degradation
//!
//! Failures reading current state, reading the log, or writing the log are
//! logged at `warn` and treated as "no information". Only store unavailability,
//! conflicts, and store write failures reach the caller.

use crate::apply;
use crate::config::CoordinatorConfig;
use crate::error::{ConfigError, MutationError};
use crate::request::MutationRequest;
use crate::result::MutationResult;
use deltaguard_core::{MutationId, MutationOperation, MutationStatus, SessionId, Timestamp, UserId};
use deltaguard_delta::{calculate_delta, deltas_conflict, RecordDelta};
use deltaguard_log::{MutationLog, MutationLogEntry};
use deltaguard_store::{RelationSchema, Schema, Store};
use parking_lot::Mutex;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Coordinates mutations for one session
///
/// # Example
///
/// ```
/// use deltaguard_coordinator::MutationCoordinator;
/// use deltaguard_store::MemoryStore;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::new("notes db"));
/// let coordinator = MutationCoordinator::builder()
///     .session_id("tab-1")
///     .relation("notes", ["id", "title", "tags"])
///     .build(store)
///     .unwrap();
///
/// let result = coordinator.insert("notes", "r1", json!({"title": "A", "tags": ["x"]}));
/// assert!(result.success);
///
/// let result = coordinator.update("notes", "r1", json!({"title": "B"}));
/// assert!(result.success);
/// assert_eq!(result.delta.unwrap().deltas.len(), 1);
/// ```
pub struct MutationCoordinator<S> {
    store: Arc<S>,
    log: MutationLog<Arc<S>>,
    schema: Schema,
    config: CoordinatorConfig,
    session_id: SessionId,
    user_id: Option<UserId>,
    /// Serializes the pipeline within this coordinator
    queue: Mutex<()>,
}

impl<S: Store> MutationCoordinator<S> {
    /// Create a builder; the store type is fixed by [`CoordinatorBuilder::build`]
    pub fn builder() -> CoordinatorBuilder<S> {
        CoordinatorBuilder::new()
    }

    /// Session every request from the wrappers is attributed to
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// User every request from the wrappers is attributed to
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Effective configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Effective relation schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The mutation log this coordinator writes
    pub fn log(&self) -> &MutationLog<Arc<S>> {
        &self.log
    }

    /// The store mutations are applied to
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run one mutation through the full pipeline
    pub fn execute_mutation(&self, request: MutationRequest) -> MutationResult {
        let _queue = self.queue.lock();
        self.execute_queued(request)
    }

    /// Run `requests` in order
    ///
    /// Stops after the first failure that is not a conflict; conflicted
    /// requests are reported and the batch continues. Later requests see the
    /// log entries written by earlier ones.
    pub fn batch_mutations<I>(&self, requests: I) -> Vec<MutationResult>
    where
        I: IntoIterator<Item = MutationRequest>,
    {
        let _queue = self.queue.lock();
        let mut results = Vec::new();
        for request in requests {
            let result = self.execute_queued(request);
            let halt = !result.success && !result.is_conflict();
            results.push(result);
            if halt {
                debug!(completed = results.len(), "batch halted on failure");
                break;
            }
        }
        results
    }

    fn execute_queued(&self, request: MutationRequest) -> MutationResult {
        let mutation_id = MutationId::new();
        let record_id = request.record_id.clone();

        // Step 1: the store must be reachable; nothing is logged otherwise
        if !self.store.is_ready() {
            debug!(%mutation_id, store = self.store.name(), "store not ready");
            return MutationResult::failed(
                mutation_id,
                record_id,
                MutationError::NotReady {
                    store: self.store.name().to_string(),
                },
            );
        }

        // Step 2: current state; a failed read is an absent record
        let before = match apply::fetch_current(
            &*self.store,
            &self.schema,
            &request.relation,
            &request.record_id,
        ) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    relation = %request.relation,
                    record_id = %request.record_id,
                    error = %e,
                    "could not read current state, diffing against absent record"
                );
                None
            }
        };

        // Step 3: delta
        let after = apply::resulting_state(&self.schema, &request, before.as_ref());
        let delta = calculate_delta(
            request.record_id.as_str(),
            request.relation.as_str(),
            before.as_ref(),
            after.as_ref(),
        );
        debug!(%mutation_id, record_id = %record_id, changes = delta.deltas.len(), "delta calculated");

        let write = apply::write_query(&self.schema, &request);

        // Step 4: conflict check, skipped for a write that cannot be built
        let mut conflicts = Vec::new();
        if write.is_ok() {
            conflicts = self.pending_conflicts(&delta);
            if let Some(stale) = self.stale_base(&request) {
                if !conflicts.contains(&stale) {
                    conflicts.push(stale);
                }
            }
        }

        let mut entry = MutationLogEntry {
            id: mutation_id,
            timestamp: Timestamp::now(),
            session_id: request.session_id,
            user_id: request.user_id,
            operation: request.operation,
            relation: request.relation,
            entity_type: request.entity_type,
            record_id: request.record_id,
            before_state: before,
            after_state: after,
            delta,
            base_version: request.base_version,
            conflict_with: Vec::new(),
            status: MutationStatus::Pending,
            applied_at: None,
            error: None,
            parent_mutation_id: request.parent_mutation_id,
        };

        let query = match write {
            Ok(query) => query,
            Err(e) => {
                let message = e.to_string();
                entry.status = MutationStatus::Failed;
                entry.error = Some(message.clone());
                if let Err(log_err) = self.log.append(&entry) {
                    warn!(%mutation_id, error = %log_err, "could not log rejected mutation");
                }
                warn!(%mutation_id, record_id = %record_id, error = %message, "write rejected");
                return MutationResult::failed(
                    mutation_id,
                    record_id,
                    MutationError::ApplyFailure { message },
                );
            }
        };

        // Step 5: conflicts leave the store untouched
        if !conflicts.is_empty() {
            info!(
                %mutation_id,
                record_id = %record_id,
                conflicts = conflicts.len(),
                "concurrent modification detected"
            );
            entry.status = MutationStatus::Conflicted;
            entry.conflict_with = conflicts.clone();
            if let Err(e) = self.log.append(&entry) {
                warn!(%mutation_id, error = %e, "could not log conflicted mutation");
            }
            return MutationResult::failed(
                mutation_id,
                record_id,
                MutationError::Conflict { conflicts },
            );
        }

        // Step 6: pending entry, then the store write
        if let Err(e) = self.log.append(&entry) {
            warn!(%mutation_id, error = %e, "could not log pending mutation");
        }

        match self.store.run_query(&query) {
            Ok(_) => {
                let applied_at = Timestamp::now();
                if let Err(e) = self.log.mark_applied(mutation_id, applied_at) {
                    warn!(%mutation_id, error = %e, "could not mark mutation applied");
                }
                debug!(%mutation_id, version = applied_at.as_millis(), "mutation applied");
                MutationResult::applied(mutation_id, record_id, entry.delta, applied_at.as_millis())
            }
            // Step 7: store failure
            Err(e) => {
                let message = e.to_string();
                if let Err(log_err) = self.log.mark_failed(mutation_id, &message) {
                    warn!(%mutation_id, error = %log_err, "could not mark mutation failed");
                }
                warn!(%mutation_id, record_id = %record_id, error = %message, "store write failed");
                MutationResult::failed(
                    mutation_id,
                    record_id,
                    MutationError::ApplyFailure { message },
                )
            }
        }
    }

    /// Ids of this record's PENDING entries whose deltas overlap `delta`
    fn pending_conflicts(&self, delta: &RecordDelta) -> Vec<MutationId> {
        match self.log.pending_for_record(&delta.record_id) {
            Ok(pending) => pending
                .into_iter()
                .filter(|entry| deltas_conflict(&entry.delta, delta))
                .map(|entry| entry.id)
                .collect(),
            Err(e) => {
                warn!(record_id = %delta.record_id, error = %e, "could not scan pending mutations");
                Vec::new()
            }
        }
    }

    /// The applied entry that makes `request.base_version` stale, if checking is on
    fn stale_base(&self, request: &MutationRequest) -> Option<MutationId> {
        if !self.config.enforce_base_version {
            return None;
        }
        let base = request.base_version?;
        match self.log.latest_applied(&request.record_id) {
            Ok(Some(latest)) => match latest.applied_at {
                Some(at) if at.as_millis() > base => Some(latest.id),
                _ => None,
            },
            Ok(None) => None,
            Err(e) => {
                warn!(record_id = %request.record_id, error = %e, "could not check base version");
                None
            }
        }
    }

    // =========================================================================
    // Convenience wrappers
    // =========================================================================

    /// A request attributed to this coordinator's session and user
    pub fn request(
        &self,
        operation: MutationOperation,
        relation: &str,
        record_id: &str,
        data: Value,
    ) -> MutationRequest {
        let request = MutationRequest::new(
            operation,
            relation,
            record_id,
            data,
            self.session_id.clone(),
        );
        match &self.user_id {
            Some(user) => request.with_user_id(user.clone()),
            None => request,
        }
    }

    /// INSERT `data` as `record_id`
    pub fn insert(&self, relation: &str, record_id: &str, data: Value) -> MutationResult {
        self.execute_mutation(self.request(MutationOperation::Insert, relation, record_id, data))
    }

    /// UPDATE the fields present in `data`
    pub fn update(&self, relation: &str, record_id: &str, data: Value) -> MutationResult {
        self.execute_mutation(self.request(MutationOperation::Update, relation, record_id, data))
    }

    /// DELETE `record_id`
    pub fn delete(&self, relation: &str, record_id: &str) -> MutationResult {
        self.execute_mutation(self.request(
            MutationOperation::Delete,
            relation,
            record_id,
            Value::Null,
        ))
    }

    /// UPSERT `data` as `record_id`
    pub fn upsert(&self, relation: &str, record_id: &str, data: Value) -> MutationResult {
        self.execute_mutation(self.request(MutationOperation::Upsert, relation, record_id, data))
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Log entries for `record_id`, newest first
    ///
    /// `limit` defaults to `history_limit` from the config. Read errors yield
    /// an empty list.
    pub fn get_mutation_history(
        &self,
        record_id: &str,
        limit: Option<usize>,
    ) -> Vec<MutationLogEntry> {
        let limit = limit.unwrap_or(self.config.history_limit);
        self.log
            .history_for_record(record_id, limit)
            .unwrap_or_else(|e| {
                warn!(record_id, error = %e, "could not read mutation history");
                Vec::new()
            })
    }

    /// Every CONFLICTED entry, newest first. Read errors yield an empty list.
    pub fn get_conflicted_mutations(&self) -> Vec<MutationLogEntry> {
        self.log
            .by_status(MutationStatus::Conflicted, None)
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not read conflicted mutations");
                Vec::new()
            })
    }
}

impl<S> std::fmt::Debug for MutationCoordinator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`MutationCoordinator`]
///
/// # Example
///
/// ```
/// use deltaguard_coordinator::{CoordinatorConfig, MutationCoordinator};
/// use deltaguard_store::MemoryStore;
/// use std::sync::Arc;
///
/// let config = CoordinatorConfig::from_toml_str(r#"
///     [relations]
///     notes = ["id", "title"]
/// "#).unwrap();
///
/// let coordinator = MutationCoordinator::builder()
///     .session_id("sync-worker")
///     .user_id("alice")
///     .config(config)
///     .build(Arc::new(MemoryStore::default()))
///     .unwrap();
/// assert!(coordinator.schema().contains("notes"));
/// ```
pub struct CoordinatorBuilder<S> {
    session_id: Option<SessionId>,
    user_id: Option<UserId>,
    config: CoordinatorConfig,
    schema: Schema,
    relations: Vec<(String, Vec<String>)>,
    store: PhantomData<fn() -> S>,
}

impl<S> Default for CoordinatorBuilder<S> {
    fn default() -> Self {
        CoordinatorBuilder {
            session_id: None,
            user_id: None,
            config: CoordinatorConfig::default(),
            schema: Schema::new(),
            relations: Vec::new(),
            store: PhantomData,
        }
    }
}

impl<S> Clone for CoordinatorBuilder<S> {
    fn clone(&self) -> Self {
        CoordinatorBuilder {
            session_id: self.session_id.clone(),
            user_id: self.user_id.clone(),
            config: self.config.clone(),
            schema: self.schema.clone(),
            relations: self.relations.clone(),
            store: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for CoordinatorBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorBuilder")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("relations", &self.relations)
            .finish()
    }
}

impl<S: Store> CoordinatorBuilder<S> {
    /// Builder with default config, a generated session id, and no user
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the session
    pub fn session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Bind the user
    pub fn user_id(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Use `config`; its `[relations]` are merged with any added here
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Add every relation of `schema`
    pub fn schema(mut self, schema: Schema) -> Self {
        for name in schema.relation_names() {
            if let Some(relation) = schema.get(name) {
                self.schema.insert(relation.clone());
            }
        }
        self
    }

    /// Declare one relation keyed by `id`
    pub fn relation<I, F>(mut self, name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: AsRef<str>,
    {
        let fields = fields.into_iter().map(|f| f.as_ref().to_string()).collect();
        self.relations.push((name.to_string(), fields));
        self
    }

    /// Validate names and bind to `store`
    ///
    /// Relations declared on the builder override same-named ones from the
    /// config.
    pub fn build(self, store: Arc<S>) -> Result<MutationCoordinator<S>, ConfigError> {
        self.config.validate()?;

        let mut schema = self.config.schema()?;
        for name in self.schema.relation_names() {
            if let Some(relation) = self.schema.get(name) {
                schema.insert(relation.clone());
            }
        }
        for (name, fields) in &self.relations {
            let relation = RelationSchema::new(name, fields)
                .map_err(|e| ConfigError::InvalidIdentifier(e.to_string()))?;
            schema.insert(relation);
        }

        let log = MutationLog::with_relation(store.clone(), &self.config.log_relation)
            .map_err(|e| ConfigError::InvalidIdentifier(e.to_string()))?;

        let session_id = self.session_id.unwrap_or_else(SessionId::generate);
        debug!(
            session_id = %session_id,
            relations = schema.len(),
            log_relation = %log.relation(),
            "mutation coordinator ready"
        );

        Ok(MutationCoordinator {
            store,
            log,
            schema,
            config: self.config,
            session_id,
            user_id: self.user_id,
            queue: Mutex::new(()),
        })
    }
}
