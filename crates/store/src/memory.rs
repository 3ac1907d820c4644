//! In-memory store
//!
//! ## Design
//!
//! - DashMap keyed by relation name: writes to different relations never
//!   contend, mirroring per-run sharding in a larger engine
//! - Each table keeps rows in insertion order (`BTreeMap<seq, Row>`) plus an
//!   FxHashMap from canonical key text to sequence number
//! - Relations are created on first write; reading an unknown relation is an
//!   [`StoreError::UnknownRelation`]
//!
//! Fault injection (`set_ready`, `fail_writes`, `fail_reads`) and write
//! counters exist so callers can exercise their degradation paths. The query
//! journal is off unless [`MemoryStore::record_queries`] turns it on.

use crate::error::{StoreError, StoreResult};
use crate::query::{Direction, Put, PutMode, Query, Remove, Select, Statement};
use crate::traits::{Rows, Store};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

/// One stored row, column name → value
pub type Row = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, Row>,
    index: FxHashMap<String, u64>,
    next_seq: u64,
    writes: u64,
}

impl Table {
    fn lookup(&self, key: &Value) -> Option<u64> {
        self.index.get(&canonical(key)).copied()
    }

    fn insert_row(&mut self, key: &Value, row: Row) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(canonical(key), seq);
        self.rows.insert(seq, row);
    }
}

#[derive(Debug, Default)]
struct Faults {
    reads: FxHashMap<String, String>,
    writes: FxHashMap<String, String>,
}

/// Thread-safe in-process [`Store`]
///
/// # Example
///
/// ```
/// use deltaguard_store::{Ident, MemoryStore, PutMode, Query, Store};
/// use serde_json::json;
///
/// let store = MemoryStore::new("memory");
/// let notes = Ident::new("notes").unwrap();
/// let id = Ident::new("id").unwrap();
/// let title = Ident::new("title").unwrap();
///
/// store
///     .run_query(&Query::put(
///         notes.clone(),
///         PutMode::Insert,
///         (id.clone(), json!("r1")),
///         vec![(title.clone(), json!("hello"))],
///     ))
///     .unwrap();
///
/// let rows = store
///     .run_query(&Query::select(notes, vec![id.clone(), title]).filter(id, json!("r1")).build())
///     .unwrap();
/// assert_eq!(rows.rows, vec![vec![json!("r1"), json!("hello")]]);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    ready: AtomicBool,
    tables: DashMap<String, Table>,
    faults: RwLock<Faults>,
    journal: AtomicBool,
    executed: Mutex<Vec<String>>,
    queries: AtomicU64,
}

impl MemoryStore {
    /// Ready, empty store
    pub fn new(name: impl Into<String>) -> Self {
        MemoryStore {
            name: name.into(),
            ready: AtomicBool::new(true),
            tables: DashMap::new(),
            faults: RwLock::new(Faults::default()),
            journal: AtomicBool::new(false),
            executed: Mutex::new(Vec::new()),
            queries: AtomicU64::new(0),
        }
    }

    /// Toggle readiness
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, AtomicOrdering::SeqCst);
    }

    /// Make every write to `relation` fail with `message`
    pub fn fail_writes(&self, relation: &str, message: impl Into<String>) {
        self.faults
            .write()
            .writes
            .insert(relation.to_string(), message.into());
    }

    /// Make every read of `relation` fail with `message`
    pub fn fail_reads(&self, relation: &str, message: impl Into<String>) {
        self.faults
            .write()
            .reads
            .insert(relation.to_string(), message.into());
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        let mut faults = self.faults.write();
        faults.reads.clear();
        faults.writes.clear();
    }

    /// Successful writes applied to `relation`
    pub fn write_count(&self, relation: &str) -> u64 {
        self.tables.get(relation).map_or(0, |t| t.writes)
    }

    /// Rows of `relation` in insertion order
    pub fn rows(&self, relation: &str) -> Vec<Row> {
        self.tables
            .get(relation)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Row of `relation` whose `key` column equals `value`
    pub fn row(&self, relation: &str, value: &Value) -> Option<Row> {
        let table = self.tables.get(relation)?;
        let seq = table.lookup(value)?;
        table.rows.get(&seq).cloned()
    }

    /// Start or stop recording query text. Stopping discards the journal.
    pub fn record_queries(&self, enabled: bool) {
        self.journal.store(enabled, AtomicOrdering::SeqCst);
        if !enabled {
            self.executed.lock().clear();
        }
    }

    /// Text of every query received while recording, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    /// Number of queries received
    pub fn query_count(&self) -> u64 {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    fn injected_fault(&self, statement: &Statement) -> Option<String> {
        let faults = self.faults.read();
        let relation = statement.relation().as_str();
        let map = if statement.is_write() {
            &faults.writes
        } else {
            &faults.reads
        };
        map.get(relation).cloned()
    }

    fn select(&self, select: &Select, query: &Query) -> StoreResult<Rows> {
        let table = self
            .tables
            .get(select.relation.as_str())
            .ok_or_else(|| StoreError::UnknownRelation(select.relation.to_string()))?;

        let mut matched: Vec<(u64, &Row)> = table
            .rows
            .iter()
            .filter(|(_, row)| {
                select.filters.iter().all(|column| {
                    let wanted = query.param(column.as_str()).unwrap_or(&Value::Null);
                    row.get(column.as_str()).unwrap_or(&Value::Null) == wanted
                })
            })
            .map(|(seq, row)| (*seq, row))
            .collect();

        if let Some((column, direction)) = &select.order_by {
            matched.sort_by(|(seq_a, a), (seq_b, b)| {
                compare_values(
                    a.get(column.as_str()).unwrap_or(&Value::Null),
                    b.get(column.as_str()).unwrap_or(&Value::Null),
                )
                .then(seq_a.cmp(seq_b))
            });
            if *direction == Direction::Descending {
                matched.reverse();
            }
        }

        if let Some(limit) = select.limit {
            matched.truncate(limit);
        }

        let rows = matched
            .into_iter()
            .map(|(_, row)| {
                select
                    .columns
                    .iter()
                    .map(|c| row.get(c.as_str()).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Rows::new(
            select.columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ))
    }

    fn put(&self, put: &Put, query: &Query) -> StoreResult<Rows> {
        let key_value = query.param(put.key.as_str()).cloned().unwrap_or(Value::Null);
        let mut table = self
            .tables
            .entry(put.relation.to_string())
            .or_insert_with(Table::default);

        let mut row = Row::new();
        row.insert(put.key.to_string(), key_value.clone());
        for column in &put.columns {
            let value = query.param(column.as_str()).cloned().unwrap_or(Value::Null);
            row.insert(column.to_string(), value);
        }

        let existing = table.lookup(&key_value);
        match (put.mode, existing) {
            (PutMode::Insert, Some(_)) => {
                return Err(StoreError::ConstraintViolation {
                    relation: put.relation.to_string(),
                    message: format!("key {} already exists", key_value),
                });
            }
            (PutMode::Update, None) => {
                return Err(StoreError::ConstraintViolation {
                    relation: put.relation.to_string(),
                    message: format!("no row with key {}", key_value),
                });
            }
            (PutMode::Update, Some(seq)) => {
                if let Some(current) = table.rows.get_mut(&seq) {
                    current.extend(row);
                }
            }
            (PutMode::Upsert, Some(seq)) => {
                table.rows.insert(seq, row);
            }
            (_, None) => table.insert_row(&key_value, row),
        }
        table.writes += 1;
        Ok(Rows::empty())
    }

    fn remove(&self, remove: &Remove, query: &Query) -> StoreResult<Rows> {
        let key_value = query
            .param(remove.key.as_str())
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(mut table) = self.tables.get_mut(remove.relation.as_str()) {
            if let Some(seq) = table.index.remove(&canonical(&key_value)) {
                table.rows.remove(&seq);
            }
            table.writes += 1;
        }
        Ok(Rows::empty())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory store")
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_ready(&self) -> bool {
        self.ready.load(AtomicOrdering::SeqCst)
    }

    fn run_query(&self, query: &Query) -> StoreResult<Rows> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if self.journal.load(AtomicOrdering::SeqCst) {
            self.executed.lock().push(query.text());
        }

        if !self.is_ready() {
            return Err(StoreError::NotReady {
                store: self.name.clone(),
            });
        }
        if let Some(message) = self.injected_fault(query.statement()) {
            tracing::debug!(relation = %query.statement().relation(), %message, "injected store fault");
            return Err(StoreError::QueryFailed(message));
        }

        match query.statement() {
            Statement::Select(select) => self.select(select, query),
            Statement::Put(put) => self.put(put, query),
            Statement::Remove(remove) => self.remove(remove, query),
        }
    }
}

fn canonical(value: &Value) -> String {
    value.to_string()
}

/// Total order for sorting: null < bool < number < string < array < object
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            match (x.as_i64(), y.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => x
                    .as_f64()
                    .unwrap_or(f64::NAN)
                    .partial_cmp(&y.as_f64().unwrap_or(f64::NAN))
                    .unwrap_or(Ordering::Equal),
            }
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)).then_with(|| a.to_string().cmp(&b.to_string())),
    }
}
