//! Typed statements with bound parameters
//!
//! ## Design
//!
//! A [`Query`] is a [`Statement`] plus named parameters. Statement shape
//! (relation, columns, filters, ordering) is built from [`Ident`]s; every
//! value travels separately in `params` and is referenced as `$column`.
//!
//! Engines that accept text get it from [`Query::text`], rendered in a
//! Datalog-style syntax:
//!
//! ```text
//! ?[id, title] := *notes{id, title}, id = $id :order -title :limit 10
//! ?[id, title] <- [[$id, $title]] :insert notes {id => title}
//! ?[id] <- [[$id]] :rm notes {id}
//! ```
//!
//! Engines that can consume structure directly (like
//! [`MemoryStore`](crate::MemoryStore)) match on [`Query::statement`].

use crate::ident::Ident;
use serde_json::Value;
use std::collections::BTreeMap;

/// Sort direction for [`Select`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// How a [`Put`] treats existing rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PutMode {
    /// Fail if the key exists
    Insert,
    /// Fail if the key is missing; only listed columns change
    Update,
    /// Create or replace the whole row
    Upsert,
}

impl PutMode {
    fn keyword(&self) -> &'static str {
        match self {
            PutMode::Insert => ":insert",
            PutMode::Update => ":update",
            PutMode::Upsert => ":put",
        }
    }
}

/// Read rows, filtered by column equality
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// Relation to read
    pub relation: Ident,
    /// Columns to return, in order
    pub columns: Vec<Ident>,
    /// Equality filters; each is bound to the parameter of the same name
    pub filters: Vec<Ident>,
    /// Optional ordering column
    pub order_by: Option<(Ident, Direction)>,
    /// Optional row cap
    pub limit: Option<usize>,
}

/// Write one row keyed by `key`
#[derive(Debug, Clone, PartialEq)]
pub struct Put {
    /// Relation to write
    pub relation: Ident,
    /// Write semantics
    pub mode: PutMode,
    /// Key column
    pub key: Ident,
    /// Non-key columns written
    pub columns: Vec<Ident>,
}

/// Delete the row with the given key
#[derive(Debug, Clone, PartialEq)]
pub struct Remove {
    /// Relation to delete from
    pub relation: Ident,
    /// Key column
    pub key: Ident,
}

/// Statement shape, free of values
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Read
    Select(Select),
    /// Write
    Put(Put),
    /// Delete
    Remove(Remove),
}

impl Statement {
    /// Relation the statement targets
    pub fn relation(&self) -> &Ident {
        match self {
            Statement::Select(s) => &s.relation,
            Statement::Put(p) => &p.relation,
            Statement::Remove(r) => &r.relation,
        }
    }

    /// Whether executing the statement changes data
    pub fn is_write(&self) -> bool {
        !matches!(self, Statement::Select(_))
    }
}

/// A statement together with its parameter bindings
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    statement: Statement,
    params: BTreeMap<String, Value>,
}

impl Query {
    /// Start a select of `columns` from `relation`
    pub fn select(relation: Ident, columns: Vec<Ident>) -> SelectBuilder {
        SelectBuilder {
            select: Select {
                relation,
                columns,
                filters: Vec::new(),
                order_by: None,
                limit: None,
            },
            params: BTreeMap::new(),
        }
    }

    /// Write one row. `key` and every column are bound as parameters.
    pub fn put(
        relation: Ident,
        mode: PutMode,
        key: (Ident, Value),
        columns: Vec<(Ident, Value)>,
    ) -> Self {
        let mut params = BTreeMap::new();
        let (key, key_value) = key;
        params.insert(key.as_str().to_string(), key_value);

        let mut names = Vec::with_capacity(columns.len());
        for (column, value) in columns {
            if column == key {
                continue;
            }
            params.insert(column.as_str().to_string(), value);
            if !names.contains(&column) {
                names.push(column);
            }
        }

        Query {
            statement: Statement::Put(Put {
                relation,
                mode,
                key,
                columns: names,
            }),
            params,
        }
    }

    /// Delete the row whose `key` column equals `value`
    pub fn remove(relation: Ident, key: Ident, value: Value) -> Self {
        let mut params = BTreeMap::new();
        params.insert(key.as_str().to_string(), value);
        Query {
            statement: Statement::Remove(Remove { relation, key }),
            params,
        }
    }

    /// Statement shape
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Bound parameters, keyed by name
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Value bound to `name`
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Render the statement as query text with `$name` placeholders
    pub fn text(&self) -> String {
        match &self.statement {
            Statement::Select(s) => {
                let columns = join(&s.columns);
                let mut text = format!("?[{columns}] := *{}{{{columns}}}", s.relation);
                for filter in &s.filters {
                    text.push_str(&format!(", {filter} = ${filter}"));
                }
                if let Some((column, direction)) = &s.order_by {
                    let sign = match direction {
                        Direction::Ascending => "",
                        Direction::Descending => "-",
                    };
                    text.push_str(&format!(" :order {sign}{column}"));
                }
                if let Some(limit) = s.limit {
                    text.push_str(&format!(" :limit {limit}"));
                }
                text
            }
            Statement::Put(p) => {
                let mut all = vec![p.key.clone()];
                all.extend(p.columns.iter().cloned());
                let placeholders = all
                    .iter()
                    .map(|c| format!("${c}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let spec = if p.columns.is_empty() {
                    p.key.to_string()
                } else {
                    format!("{} => {}", p.key, join(&p.columns))
                };
                format!(
                    "?[{}] <- [[{placeholders}]] {} {} {{{spec}}}",
                    join(&all),
                    p.mode.keyword(),
                    p.relation
                )
            }
            Statement::Remove(r) => {
                format!("?[{key}] <- [[${key}]] :rm {} {{{key}}}", r.relation, key = r.key)
            }
        }
    }
}

/// Builder for select queries
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select: Select,
    params: BTreeMap<String, Value>,
}

impl SelectBuilder {
    /// Keep only rows whose `column` equals `value`
    pub fn filter(mut self, column: Ident, value: Value) -> Self {
        self.params.insert(column.as_str().to_string(), value);
        if !self.select.filters.contains(&column) {
            self.select.filters.push(column);
        }
        self
    }

    /// Sort by `column`
    pub fn order_by(mut self, column: Ident, direction: Direction) -> Self {
        self.select.order_by = Some((column, direction));
        self
    }

    /// Return at most `limit` rows
    pub fn limit(mut self, limit: usize) -> Self {
        self.select.limit = Some(limit);
        self
    }

    /// Finish the query
    pub fn build(self) -> Query {
        Query {
            statement: Statement::Select(self.select),
            params: self.params,
        }
    }
}

fn join(idents: &[Ident]) -> String {
    idents
        .iter()
        .map(Ident::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
