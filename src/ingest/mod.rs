//! CSV-to-relational ingestion
//!
//! Raw datasets (header-keyed string rows) are turned into typed tables in
//! the embedded engine:
//!
//! - [`infer`] decides one storage type per column
//! - [`statement`] emits the create/insert statements and bound values
//! - [`loader`] parses CSV sources and loads them concurrently
//! - [`ingest`] applies a dataset to an engine at most once per table name

pub mod infer;
pub mod loader;
pub mod statement;

use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::Result;

pub use infer::{infer_type, CellValue, ColumnType};
pub use loader::{
    discover_csv_files, load_all, load_csv_file, load_each, parse_csv, DatasetSource,
};
pub use statement::{build_table_spec, quote_identifier, sanitize_identifier, BoundRow, ColumnSpec, TableSpec};

/// One raw record: column name to raw string, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing the value if the key is already present
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

/// A named set of raw rows destined for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    pub name: String,
    pub rows: Vec<RawRow>,
}

impl RawDataset {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// What [`ingest`] did with a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The table was created and this many rows were inserted
    Created { rows: usize },
    /// A table with the dataset's name already existed; nothing was touched
    AlreadyExists,
    /// The dataset had no rows; the engine was not called
    Empty,
}

/// Apply a dataset to the engine unless a table with its name already exists.
///
/// The existing table is not compared against the dataset: the guarantee is
/// at-most-once ingestion per table name, not schema agreement. Ingestion
/// errors are returned to the caller as-is.
pub fn ingest<E: Engine + ?Sized>(engine: &mut E, dataset: &RawDataset) -> Result<IngestOutcome> {
    if dataset.is_empty() {
        debug!(table = %dataset.name, "Dataset has no rows, skipping");
        return Ok(IngestOutcome::Empty);
    }

    if engine.table_exists(&dataset.name)? {
        debug!(table = %dataset.name, "Table already exists, skipping ingestion");
        return Ok(IngestOutcome::AlreadyExists);
    }

    let spec = build_table_spec(&dataset.name, &dataset.rows);
    engine.execute_batch(&spec.create_sql)?;
    let rows = engine.insert_rows(&spec.insert_sql, &spec.values)?;

    info!(
        table = %spec.name,
        columns = spec.columns.len(),
        rows = rows,
        "Ingested dataset"
    );

    Ok(IngestOutcome::Created { rows })
}

/// Ingest datasets in order, stopping at the first failure.
pub fn ingest_all<E: Engine + ?Sized>(
    engine: &mut E,
    datasets: &[RawDataset],
) -> Result<Vec<IngestOutcome>> {
    datasets
        .iter()
        .map(|dataset| ingest(engine, dataset))
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording engine for verifying engine call sequences.

    use std::collections::HashSet;

    use super::BoundRow;
    use crate::engine::{Engine, Row};
    use crate::error::{EngineError, Result};

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        ExecuteBatch(String),
        InsertRows { sql: String, rows: usize },
        Query(String),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingEngine {
        pub(crate) calls: Vec<Call>,
        pub(crate) tables: HashSet<String>,
        pub(crate) fail_inserts: bool,
    }

    impl RecordingEngine {
        pub(crate) fn creates(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::ExecuteBatch(_)))
                .count()
        }

        pub(crate) fn insert_batches(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::InsertRows { .. }))
                .count()
        }
    }

    impl Engine for RecordingEngine {
        fn table_exists(&self, name: &str) -> Result<bool> {
            Ok(self.tables.contains(name))
        }

        fn table_names(&self) -> Result<Vec<String>> {
            let mut names: Vec<String> = self.tables.iter().cloned().collect();
            names.sort();
            Ok(names)
        }

        fn execute_batch(&mut self, sql: &str) -> Result<()> {
            self.calls.push(Call::ExecuteBatch(sql.to_string()));
            if let Some(rest) = sql.strip_prefix("CREATE TABLE IF NOT EXISTS ") {
                if let Some(name) = rest.split_whitespace().next() {
                    self.tables.insert(name.trim_matches('"').to_string());
                }
            }
            Ok(())
        }

        fn insert_rows(&mut self, insert_sql: &str, rows: &[BoundRow]) -> Result<usize> {
            self.calls.push(Call::InsertRows {
                sql: insert_sql.to_string(),
                rows: rows.len(),
            });
            if self.fail_inserts {
                return Err(EngineError::operation("insert", "constraint failed").into());
            }
            Ok(rows.len())
        }

        fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
            self.calls.push(Call::Query(sql.to_string()));
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingEngine};
    use super::*;

    fn users() -> RawDataset {
        let rows = vec![
            [("id", "1"), ("name", "Al")],
            [("id", "2"), ("name", "Bo")],
        ]
        .into_iter()
        .map(|pairs| {
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect();
        RawDataset::new("users", rows)
    }

    #[test]
    fn test_ingest_creates_then_inserts() {
        let mut engine = RecordingEngine::default();
        let outcome = ingest(&mut engine, &users()).unwrap();

        assert_eq!(outcome, IngestOutcome::Created { rows: 2 });
        assert_eq!(
            engine.calls,
            vec![
                Call::ExecuteBatch(
                    r#"CREATE TABLE IF NOT EXISTS "users" ("id" INTEGER, "name" VARCHAR);"#.into()
                ),
                Call::InsertRows {
                    sql: r#"INSERT INTO "users" ("id", "name") VALUES ($0, $1)"#.into(),
                    rows: 2,
                },
            ]
        );
    }

    #[test]
    fn test_ingest_twice_is_idempotent() {
        let mut engine = RecordingEngine::default();
        let dataset = users();

        ingest(&mut engine, &dataset).unwrap();
        let second = ingest(&mut engine, &dataset).unwrap();

        assert_eq!(second, IngestOutcome::AlreadyExists);
        assert_eq!(engine.creates(), 1);
        assert_eq!(engine.insert_batches(), 1);
    }

    #[test]
    fn test_existing_table_is_not_touched() {
        let mut engine = RecordingEngine::default();
        engine.tables.insert("users".into());

        let outcome = ingest(&mut engine, &users()).unwrap();
        assert_eq!(outcome, IngestOutcome::AlreadyExists);
        assert!(engine.calls.is_empty());
    }

    #[test]
    fn test_empty_dataset_makes_no_engine_calls() {
        let mut engine = RecordingEngine::default();
        let outcome = ingest(&mut engine, &RawDataset::new("t", Vec::new())).unwrap();

        assert_eq!(outcome, IngestOutcome::Empty);
        assert!(engine.calls.is_empty());
        assert!(engine.tables.is_empty());
    }

    #[test]
    fn test_insert_failure_propagates() {
        let mut engine = RecordingEngine {
            fail_inserts: true,
            ..Default::default()
        };
        let result = ingest(&mut engine, &users());
        assert!(result.is_err());
        assert_eq!(engine.creates(), 1);
    }

    #[test]
    fn test_ingest_all_skips_duplicate_names() {
        let mut engine = RecordingEngine::default();
        let outcomes = ingest_all(&mut engine, &[users(), users()]).unwrap();
        assert_eq!(
            outcomes,
            vec![IngestOutcome::Created { rows: 2 }, IngestOutcome::AlreadyExists]
        );
    }

    #[test]
    fn test_raw_row_keeps_insertion_order_and_replaces() {
        let mut row = RawRow::new();
        row.insert("b", "1");
        row.insert("a", "2");
        row.insert("b", "3");
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(row.get("b"), Some("3"));
        assert_eq!(row.len(), 2);
    }
}
