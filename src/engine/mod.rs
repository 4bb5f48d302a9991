//! Embedded relational engine interface
//!
//! The engine is an external collaborator: the ingestion pipeline hands it
//! schema and parameterized insert statements, and the query path hands it
//! user statements and reads back column-keyed rows. [`sqlite`] provides the
//! in-memory SQLite implementation used by the shell.

pub mod sqlite;

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::ingest::BoundRow;

pub use sqlite::SqliteEngine;

/// Default cap on rows collected from a single statement.
pub const DEFAULT_MAX_ROWS: usize = 10_000;

/// Operations the core needs from an embedded engine.
pub trait Engine {
    /// Whether a table with exactly this name is in the catalog
    fn table_exists(&self, name: &str) -> Result<bool>;

    /// Names of user tables, sorted
    fn table_names(&self) -> Result<Vec<String>>;

    /// Run one or more statements that return no rows
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Prepare `insert_sql` once and execute it for every bound row.
    ///
    /// Returns the number of rows inserted. The prepared statement is
    /// released before returning, on success and on failure.
    fn insert_rows(&mut self, insert_sql: &str, rows: &[BoundRow]) -> Result<usize>;

    /// Run a user statement and collect the rows it yields
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;

    /// Whether the last `query` stopped at the engine's row limit
    fn last_query_truncated(&self) -> bool {
        false
    }
}

/// A single value read back from the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// One result row: column name to value, in result column order.
///
/// Setting a column that is already present replaces its value and keeps
/// its position, so `SELECT a.id, b.id` yields a single `id` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}
