//! SQLite engine implementation
//!
//! `SqliteEngine` owns an in-memory SQLite connection. Ingested datasets
//! become regular tables, so every SQLite built-in (joins, aggregates,
//! `strftime`, ...) is available to user statements.

use base64::Engine as _;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, ToSql};
use tracing::{info, warn};

use super::{Engine, Row, Value, DEFAULT_MAX_ROWS};
use crate::error::{EngineError, Result};
use crate::ingest::{BoundRow, CellValue};

const TABLE_EXISTS_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table' AND name = ?1";

const TABLE_NAMES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// The in-memory SQLite engine.
pub struct SqliteEngine {
    conn: Connection,
    /// Maximum rows collected per statement (for memory safety).
    max_rows: usize,
    /// Set when the last query hit `max_rows`
    truncated: bool,
}

impl SqliteEngine {
    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_max_rows(DEFAULT_MAX_ROWS)
    }

    /// Open a fresh in-memory database with a custom row limit.
    pub fn with_max_rows(max_rows: usize) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            EngineError::operation("open", format!("failed to open in-memory SQLite database: {}", e))
        })?;

        info!(max_rows = max_rows, "SQLite engine initialized (in-memory)");

        Ok(Self {
            conn,
            max_rows,
            truncated: false,
        })
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }
}

impl Engine for SqliteEngine {
    fn table_exists(&self, name: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(TABLE_EXISTS_SQL, [name], |_| Ok(()))
            .optional()
            .map_err(|e| EngineError::operation("catalog lookup", e.to_string()))?;
        Ok(found.is_some())
    }

    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(TABLE_NAMES_SQL)
            .map_err(|e| EngineError::operation("list tables", e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| EngineError::operation("list tables", e.to_string()))?;
        Ok(names)
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| EngineError::operation("execute", e.to_string()))?;
        Ok(())
    }

    fn insert_rows(&mut self, insert_sql: &str, rows: &[BoundRow]) -> Result<usize> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| EngineError::operation("begin insert", e.to_string()))?;

        let mut inserted = 0usize;
        {
            // Dropping the statement finalizes it, including on the `?` paths.
            let mut stmt = tx
                .prepare(insert_sql)
                .map_err(|e| EngineError::operation("prepare insert", e.to_string()))?;

            for row in rows {
                let params: Vec<(&str, &dyn ToSql)> = row
                    .iter()
                    .map(|(name, value)| (name, value as &dyn ToSql))
                    .collect();
                inserted += stmt
                    .execute(params.as_slice())
                    .map_err(|e| EngineError::operation("insert row", e.to_string()))?;
            }
        }

        tx.commit()
            .map_err(|e| EngineError::operation("commit insert", e.to_string()))?;

        Ok(inserted)
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.truncated = false;
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| EngineError::statement(e.to_string()))?;

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt
            .query([])
            .map_err(|e| EngineError::statement(e.to_string()))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| EngineError::statement(e.to_string()))?
        {
            if out.len() >= self.max_rows {
                warn!(max_rows = self.max_rows, "Query result truncated at max rows");
                self.truncated = true;
                break;
            }
            let mut record = Row::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let value = row
                    .get_ref(i)
                    .map(value_from_ref)
                    .map_err(|e| EngineError::statement(e.to_string()))?;
                record.insert(column.as_str(), value);
            }
            out.push(record);
        }

        Ok(out)
    }

    fn last_query_truncated(&self) -> bool {
        self.truncated
    }
}

/// Convert a borrowed SQLite value, rendering blobs as Base64 text.
fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Integer(n),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => Value::Text(base64::engine::general_purpose::STANDARD.encode(b)),
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Integer(n) => ToSqlOutput::from(*n),
            CellValue::Decimal(f) => ToSqlOutput::from(*f),
            CellValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}
