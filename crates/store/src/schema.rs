//! Static relation schema map
//!
//! Maps a relation name to its ordered field list. The coordinator consults
//! it to shape fetch and write statements. A relation missing from the map
//! has no fetchable prior state.

use crate::error::StoreResult;
use crate::ident::Ident;
use std::collections::BTreeMap;

/// Default key column
pub const DEFAULT_KEY: &str = "id";

/// Field layout of one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSchema {
    name: Ident,
    key: Ident,
    fields: Vec<Ident>,
}

impl RelationSchema {
    /// Relation keyed by `id`. `id` is added as the first field if absent.
    pub fn new<I, S>(name: &str, fields: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_key(name, DEFAULT_KEY, fields)
    }

    /// Relation keyed by `key`. `key` is added as the first field if absent.
    pub fn with_key<I, S>(name: &str, key: &str, fields: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = Ident::new(name)?;
        let key = Ident::new(key)?;
        let mut columns = Vec::new();
        for field in fields {
            let field = Ident::new(field.as_ref())?;
            if !columns.contains(&field) {
                columns.push(field);
            }
        }
        if !columns.contains(&key) {
            columns.insert(0, key.clone());
        }
        Ok(RelationSchema {
            name,
            key,
            fields: columns,
        })
    }

    /// Relation name
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// Key column
    pub fn key(&self) -> &Ident {
        &self.key
    }

    /// All columns in declaration order, key included
    pub fn fields(&self) -> &[Ident] {
        &self.fields
    }

    /// Columns other than the key
    pub fn value_fields(&self) -> impl Iterator<Item = &Ident> {
        self.fields.iter().filter(move |f| *f != &self.key)
    }
}

/// Relation name → field layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    relations: BTreeMap<String, RelationSchema>,
}

impl Schema {
    /// Empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a relation, builder style
    pub fn with_relation<I, S>(mut self, name: &str, fields: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(RelationSchema::new(name, fields)?);
        Ok(self)
    }

    /// Add (or replace) a relation
    pub fn insert(&mut self, relation: RelationSchema) {
        self.relations
            .insert(relation.name().as_str().to_string(), relation);
    }

    /// Layout of `relation`, if declared
    pub fn get(&self, relation: &str) -> Option<&RelationSchema> {
        self.relations.get(relation)
    }

    /// Is `relation` declared?
    pub fn contains(&self, relation: &str) -> bool {
        self.relations.contains_key(relation)
    }

    /// Declared relation names, sorted
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    /// Number of declared relations
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// No relations declared
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Build from a plain name → fields map (as read from configuration)
    pub fn from_map(map: &BTreeMap<String, Vec<String>>) -> StoreResult<Self> {
        let mut schema = Schema::new();
        for (name, fields) in map {
            schema.insert(RelationSchema::new(name, fields)?);
        }
        Ok(schema)
    }
}
