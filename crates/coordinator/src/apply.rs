//! Store-facing statements for one mutation
//!
//! ## Record layout
//!
//! A declared relation stores one column per schema field. The key column
//! holds the record id and is not part of the record's snapshot; snapshots
//! are objects of the remaining fields.
//!
//! A relation missing from the schema has no fetchable state. Writes to it
//! use the key column `id` plus the data object's own keys, sorted.
//!
//! ## Write shapes
//!
//! | Operation | Statement | Columns |
//! |-----------|-----------|---------|
//! | INSERT | `Put/Insert` | every field, absent ones null |
//! | UPDATE | `Put/Update` | fields present in `data` |
//! | UPSERT | `Put/Upsert` | every field, absent ones null |
//! | DELETE | `Remove` | key only |

use crate::request::MutationRequest;
use deltaguard_core::MutationOperation;
use deltaguard_store::{
    Ident, PutMode, Query, RelationSchema, Schema, Store, StoreError, StoreResult,
};
use serde_json::{Map, Value};

/// Key column and value columns a write to `request.relation` uses
struct Layout {
    relation: Ident,
    key: Ident,
    fields: Vec<Ident>,
}

impl Layout {
    fn resolve(schema: &Schema, request: &MutationRequest) -> StoreResult<Self> {
        match schema.get(&request.relation) {
            Some(declared) => Ok(Self::declared(declared)),
            None => Self::ad_hoc(request),
        }
    }

    fn declared(relation: &RelationSchema) -> Self {
        Layout {
            relation: relation.name().clone(),
            key: relation.key().clone(),
            fields: relation.value_fields().cloned().collect(),
        }
    }

    fn ad_hoc(request: &MutationRequest) -> StoreResult<Self> {
        let key = Ident::new(deltaguard_store::schema::DEFAULT_KEY)?;
        let mut names: Vec<&String> = match &request.data {
            Value::Object(map) => map.keys().collect(),
            _ => Vec::new(),
        };
        names.sort();
        let fields = names
            .into_iter()
            .filter(|name| name.as_str() != key.as_str())
            .map(|name| Ident::new(name.as_str()))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(Layout {
            relation: Ident::new(request.relation.as_str())?,
            key,
            fields,
        })
    }
}

/// Current state of `(relation, record_id)`
///
/// `Ok(None)` when the relation is not declared or the record is absent.
pub(crate) fn fetch_current<S: Store + ?Sized>(
    store: &S,
    schema: &Schema,
    relation: &str,
    record_id: &str,
) -> StoreResult<Option<Value>> {
    let declared = match schema.get(relation) {
        Some(declared) => declared,
        None => return Ok(None),
    };
    let layout = Layout::declared(declared);

    let query = Query::select(layout.relation.clone(), layout.fields.clone())
        .filter(layout.key.clone(), Value::from(record_id))
        .limit(1)
        .build();
    match store.run_query(&query) {
        Ok(rows) => Ok(rows.object(0).map(Value::Object)),
        // declared but never written
        Err(StoreError::UnknownRelation(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// State the write for `request` will leave behind, given `before`
///
/// DELETE leaves nothing. UPDATE overlays the given fields on `before`.
/// INSERT and UPSERT replace the record. For a declared relation only
/// schema fields are kept, since nothing else is persisted.
pub(crate) fn resulting_state(
    schema: &Schema,
    request: &MutationRequest,
    before: Option<&Value>,
) -> Option<Value> {
    let data = match &request.data {
        Value::Object(map) => map,
        other => {
            return match request.operation {
                MutationOperation::Delete => None,
                _ => Some(other.clone()),
            }
        }
    };

    let declared = schema.get(&request.relation);
    let key = declared.map_or(deltaguard_store::schema::DEFAULT_KEY, |r| r.key().as_str());
    let persisted = |name: &str| match declared {
        Some(relation) => relation.value_fields().any(|f| f.as_str() == name),
        None => name != key,
    };

    match request.operation {
        MutationOperation::Delete => None,
        MutationOperation::Update => {
            let mut state = match before {
                Some(Value::Object(existing)) => existing.clone(),
                _ => Map::new(),
            };
            for (name, value) in data {
                if persisted(name.as_str()) {
                    state.insert(name.clone(), value.clone());
                }
            }
            Some(Value::Object(state))
        }
        MutationOperation::Insert | MutationOperation::Upsert => {
            let state: Map<String, Value> = match declared {
                Some(relation) => relation
                    .value_fields()
                    .map(|f| {
                        let value = data.get(f.as_str()).cloned().unwrap_or(Value::Null);
                        (f.to_string(), value)
                    })
                    .collect(),
                None => data
                    .iter()
                    .filter(|(name, _)| persisted(name.as_str()))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect(),
            };
            Some(Value::Object(state))
        }
    }
}

/// The write statement for `request`
///
/// Puts need an object of column values; any other `data` is
/// [`StoreError::InvalidRow`].
pub(crate) fn write_query(schema: &Schema, request: &MutationRequest) -> StoreResult<Query> {
    let layout = Layout::resolve(schema, request)?;
    let key = (layout.key, Value::from(request.record_id.as_str()));

    let mode = match request.operation {
        MutationOperation::Delete => {
            let (column, value) = key;
            return Ok(Query::remove(layout.relation, column, value));
        }
        MutationOperation::Insert => PutMode::Insert,
        MutationOperation::Update => PutMode::Update,
        MutationOperation::Upsert => PutMode::Upsert,
    };

    if !request.data.is_object() {
        return Err(StoreError::InvalidRow {
            relation: layout.relation.to_string(),
            message: format!("{} data must be an object", request.operation),
        });
    }

    let columns = layout
        .fields
        .into_iter()
        .filter_map(|field| {
            let value = request.data.get(field.as_str()).cloned();
            match (mode, value) {
                (PutMode::Update, None) => None,
                (_, value) => Some((field, value.unwrap_or(Value::Null))),
            }
        })
        .collect();

    Ok(Query::put(layout.relation, mode, key, columns))
}
