//! Mutation log entries and their row encoding
//!
//! One [`MutationLogEntry`] is one row of the log relation. Structured
//! columns (`before_state`, `after_state`, `delta`, `conflict_with`) are
//! stored as JSON text, encoded exactly once on write and decoded exactly
//! once on read. An absent state is stored as `null`; a record whose state
//! is JSON `null` is stored as the text `"null"`.

use crate::error::{LogError, LogResult};
use deltaguard_core::{
    MutationId, MutationOperation, MutationStatus, SessionId, Timestamp, UserId,
};
use deltaguard_delta::RecordDelta;
use deltaguard_store::{Ident, StoreResult};
use serde_json::{Map, Value};

// =============================================================================
// Columns
// =============================================================================

pub(crate) const ID: &str = "id";
pub(crate) const TIMESTAMP: &str = "timestamp";
pub(crate) const SESSION_ID: &str = "session_id";
pub(crate) const USER_ID: &str = "user_id";
pub(crate) const OPERATION: &str = "operation";
pub(crate) const RELATION: &str = "relation";
pub(crate) const ENTITY_TYPE: &str = "entity_type";
pub(crate) const RECORD_ID: &str = "record_id";
pub(crate) const BEFORE_STATE: &str = "before_state";
pub(crate) const AFTER_STATE: &str = "after_state";
pub(crate) const DELTA: &str = "delta";
pub(crate) const BASE_VERSION: &str = "base_version";
pub(crate) const STATUS: &str = "status";
pub(crate) const CONFLICT_WITH: &str = "conflict_with";
pub(crate) const APPLIED_AT: &str = "applied_at";
pub(crate) const ERROR: &str = "error";
pub(crate) const PARENT_MUTATION_ID: &str = "parent_mutation_id";

/// Every log column, key first
pub(crate) const COLUMNS: [&str; 17] = [
    ID,
    TIMESTAMP,
    SESSION_ID,
    USER_ID,
    OPERATION,
    RELATION,
    ENTITY_TYPE,
    RECORD_ID,
    BEFORE_STATE,
    AFTER_STATE,
    DELTA,
    BASE_VERSION,
    STATUS,
    CONFLICT_WITH,
    APPLIED_AT,
    ERROR,
    PARENT_MUTATION_ID,
];

pub(crate) fn ident(name: &str) -> StoreResult<Ident> {
    Ident::new(name)
}

pub(crate) fn column_idents() -> StoreResult<Vec<Ident>> {
    COLUMNS.iter().map(|c| ident(c)).collect()
}

// =============================================================================
// MutationLogEntry
// =============================================================================

/// Audit record of one attempted mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationLogEntry {
    /// Unique id
    pub id: MutationId,
    /// When the mutation was attempted
    pub timestamp: Timestamp,
    /// Originating session
    pub session_id: SessionId,
    /// Originating user, if known
    pub user_id: Option<UserId>,
    /// Requested operation
    pub operation: MutationOperation,
    /// Target relation
    pub relation: String,
    /// Free-form type tag supplied by the caller
    pub entity_type: Option<String>,
    /// Target record
    pub record_id: String,
    /// Record state read before the mutation (`None`: absent or unreadable)
    pub before_state: Option<Value>,
    /// Intended state after the mutation (`None`: deleted)
    pub after_state: Option<Value>,
    /// Computed diff from `before_state` to `after_state`
    pub delta: RecordDelta,
    /// Version the client based its change on
    pub base_version: Option<i64>,
    /// Entries this one was found to conflict with
    pub conflict_with: Vec<MutationId>,
    /// Lifecycle status
    pub status: MutationStatus,
    /// When the write reached the store
    pub applied_at: Option<Timestamp>,
    /// Store error message for `FAILED` entries
    pub error: Option<String>,
    /// Mutation this one was derived from (undo, retry)
    pub parent_mutation_id: Option<MutationId>,
}

impl MutationLogEntry {
    /// Column/value pairs for a full-row write. Key column excluded.
    pub(crate) fn to_columns(&self) -> LogResult<Vec<(Ident, Value)>> {
        let conflict_with: Vec<String> =
            self.conflict_with.iter().map(|id| id.to_string()).collect();

        let values = [
            (TIMESTAMP, Value::from(self.timestamp.as_millis())),
            (SESSION_ID, Value::from(self.session_id.as_str())),
            (USER_ID, opt_str(self.user_id.as_ref().map(UserId::as_str))),
            (OPERATION, Value::from(self.operation.as_str())),
            (RELATION, Value::from(self.relation.as_str())),
            (ENTITY_TYPE, opt_str(self.entity_type.as_deref())),
            (RECORD_ID, Value::from(self.record_id.as_str())),
            (BEFORE_STATE, encode_state(self.before_state.as_ref())?),
            (AFTER_STATE, encode_state(self.after_state.as_ref())?),
            (DELTA, Value::String(serde_json::to_string(&self.delta)?)),
            (BASE_VERSION, self.base_version.map_or(Value::Null, Value::from)),
            (STATUS, Value::from(self.status.as_str())),
            (CONFLICT_WITH, Value::String(serde_json::to_string(&conflict_with)?)),
            (
                APPLIED_AT,
                self.applied_at.map_or(Value::Null, |t| Value::from(t.as_millis())),
            ),
            (ERROR, opt_str(self.error.as_deref())),
            (
                PARENT_MUTATION_ID,
                self.parent_mutation_id
                    .map_or(Value::Null, |id| Value::String(id.to_string())),
            ),
        ];

        values
            .into_iter()
            .map(|(name, value)| Ok((ident(name)?, value)))
            .collect()
    }

    /// Decode a row returned by a select of [`COLUMNS`]
    pub(crate) fn from_row(row: &Map<String, Value>) -> LogResult<Self> {
        let id = parse_id(ID, req_str(row, ID)?)?;
        let conflict_with: Vec<String> = decode_json(CONFLICT_WITH, req_str(row, CONFLICT_WITH)?)?;

        Ok(MutationLogEntry {
            id,
            timestamp: Timestamp::from_millis(req_i64(row, TIMESTAMP)?),
            session_id: SessionId::new(req_str(row, SESSION_ID)?),
            user_id: opt_string(row, USER_ID)?.map(UserId::new),
            operation: req_str(row, OPERATION)?
                .parse()
                .map_err(|e| malformed(OPERATION, e))?,
            relation: req_str(row, RELATION)?.to_string(),
            entity_type: opt_string(row, ENTITY_TYPE)?,
            record_id: req_str(row, RECORD_ID)?.to_string(),
            before_state: decode_state(row, BEFORE_STATE)?,
            after_state: decode_state(row, AFTER_STATE)?,
            delta: decode_json(DELTA, req_str(row, DELTA)?)?,
            base_version: opt_i64(row, BASE_VERSION)?,
            conflict_with: conflict_with
                .iter()
                .map(|raw| parse_id(CONFLICT_WITH, raw))
                .collect::<LogResult<_>>()?,
            status: req_str(row, STATUS)?
                .parse()
                .map_err(|e| malformed(STATUS, e))?,
            applied_at: opt_i64(row, APPLIED_AT)?.map(Timestamp::from_millis),
            error: opt_string(row, ERROR)?,
            parent_mutation_id: opt_string(row, PARENT_MUTATION_ID)?
                .map(|raw| parse_id(PARENT_MUTATION_ID, &raw))
                .transpose()?,
        })
    }
}

// =============================================================================
// Codec helpers
// =============================================================================

fn malformed(column: &'static str, reason: impl ToString) -> LogError {
    LogError::MalformedRow {
        column,
        reason: reason.to_string(),
    }
}

fn opt_str(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

fn encode_state(state: Option<&Value>) -> LogResult<Value> {
    match state {
        Some(value) => Ok(Value::String(serde_json::to_string(value)?)),
        None => Ok(Value::Null),
    }
}

fn decode_state(row: &Map<String, Value>, column: &'static str) -> LogResult<Option<Value>> {
    opt_string(row, column)?
        .map(|text| decode_json(column, &text))
        .transpose()
}

fn decode_json<T: serde::de::DeserializeOwned>(column: &'static str, text: &str) -> LogResult<T> {
    serde_json::from_str(text).map_err(|e| malformed(column, e))
}

fn parse_id(column: &'static str, raw: &str) -> LogResult<MutationId> {
    raw.parse().map_err(|e| malformed(column, e))
}

fn req_str<'a>(row: &'a Map<String, Value>, column: &'static str) -> LogResult<&'a str> {
    match row.get(column) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(column, format!("expected string, got {other}"))),
        None => Err(malformed(column, "missing")),
    }
}

fn opt_string(row: &Map<String, Value>, column: &'static str) -> LogResult<Option<String>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(malformed(column, format!("expected string, got {other}"))),
    }
}

fn req_i64(row: &Map<String, Value>, column: &'static str) -> LogResult<i64> {
    opt_i64(row, column)?.ok_or_else(|| malformed(column, "missing"))
}

fn opt_i64(row: &Map<String, Value>, column: &'static str) -> LogResult<Option<i64>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or_else(|| malformed(column, format!("expected integer, got {value}"))),
    }
}
