//! Workbench session state
//!
//! A [`Session`] holds everything one user works with: the engine slot
//! (empty until start-up finishes), the edit buffer with its history, the
//! last projected result and the last error text. Nothing here is global;
//! the shell shares a session behind a lock when it needs to.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::WorkbenchConfig;
use crate::engine::{Engine, SqliteEngine};
use crate::error::{CsvqlError, Result};
use crate::history::{HistoryLog, NavState, QueryEditor};
use crate::ingest::{discover_csv_files, ingest_all, load_each, IngestOutcome, RawDataset};
use crate::projection::{project, ResultTable};

/// A session shared between the shell and the background loader
pub type SharedSession<E> = Arc<Mutex<Session<E>>>;

pub struct Session<E: Engine> {
    engine: Option<E>,
    editor: QueryEditor,
    result: ResultTable,
    last_error: Option<String>,
}

impl<E: Engine> Session<E> {
    /// Create a session with `initial_query` in the edit buffer and no engine.
    pub fn new(initial_query: impl Into<String>) -> Self {
        Self {
            engine: None,
            editor: QueryEditor::new(initial_query),
            result: ResultTable::default(),
            last_error: None,
        }
    }

    /// Make the engine available to statements
    pub fn attach_engine(&mut self, engine: E) {
        self.engine = Some(engine);
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Ingest datasets into the attached engine.
    pub fn ingest(&mut self, datasets: &[RawDataset]) -> Result<Vec<IngestOutcome>> {
        let engine = self.engine.as_mut().ok_or(CsvqlError::EngineNotReady)?;
        ingest_all(engine, datasets)
    }

    pub fn buffer(&self) -> &str {
        self.editor.buffer()
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.editor.set_buffer(text);
    }

    /// Clear the buffer without executing it
    pub fn discard_buffer(&mut self) {
        self.editor.discard();
    }

    /// Returns true if the buffer changed
    pub fn recall_previous(&mut self) -> bool {
        self.editor.recall_previous()
    }

    /// Returns true if the buffer changed
    pub fn recall_next(&mut self) -> bool {
        self.editor.recall_next()
    }

    pub fn history(&self) -> &HistoryLog {
        self.editor.history()
    }

    pub fn nav_state(&self) -> NavState {
        self.editor.state()
    }

    /// Result of the last successful statement
    pub fn result(&self) -> &ResultTable {
        &self.result
    }

    /// Error text of the last execution, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Execute the edit buffer.
    ///
    /// Before the engine is attached this fails with `EngineNotReady` and
    /// leaves the buffer and history untouched. Otherwise the buffer is
    /// committed to history first, so a statement the engine rejects is still
    /// recorded. A failure keeps the previous result.
    pub fn execute(&mut self) -> Result<&ResultTable> {
        self.last_error = None;

        let Some(engine) = self.engine.as_mut() else {
            self.last_error = Some(CsvqlError::EngineNotReady.to_string());
            return Err(CsvqlError::EngineNotReady);
        };

        let statement = self.editor.commit();
        debug!(statement = %statement, "Executing statement");

        match engine.query(&statement) {
            Ok(rows) => {
                self.result = project(&rows);
                self.result.truncated = engine.last_query_truncated();
                Ok(&self.result)
            }
            Err(e) => {
                debug!(error = %e, "Statement failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the buffer with `text` and execute it
    pub fn execute_text(&mut self, text: impl Into<String>) -> Result<&ResultTable> {
        self.set_buffer(text);
        self.execute()
    }
}

/// An opened engine plus whatever the dataset loads produced.
pub struct PreparedEngine {
    pub engine: SqliteEngine,
    /// Datasets that loaded, in source order
    pub datasets: Vec<RawDataset>,
    /// First load failure, if any source could not be read
    pub load_error: Option<CsvqlError>,
}

/// Start the engine and load every configured dataset.
///
/// Engine start-up runs on a blocking task while the dataset loads run
/// concurrently; both are joined before this returns, and nothing is
/// ingested yet. Only an engine start-up failure is an error here; load
/// failures are reported alongside the engine.
pub async fn prepare_engine(config: &WorkbenchConfig) -> Result<PreparedEngine> {
    let max_rows = config.max_rows;
    let engine_task = tokio::task::spawn_blocking(move || SqliteEngine::with_max_rows(max_rows));

    let mut sources = config.datasets.clone();
    let mut load_error = None;
    if let Some(ref dir) = config.data_dir {
        match discover_csv_files(dir).await {
            Ok(found) => sources.extend(found),
            Err(e) => {
                warn!(error = %e, "Data directory scan failed");
                load_error = Some(e);
            }
        }
    }

    let mut datasets = Vec::with_capacity(sources.len());
    for outcome in load_each(sources).await {
        match outcome {
            Ok(dataset) => datasets.push(dataset),
            Err(e) => {
                load_error.get_or_insert(e);
            }
        }
    }
    let engine = engine_task.await??;

    Ok(PreparedEngine {
        engine,
        datasets,
        load_error,
    })
}

/// Open a ready session: engine started, every dataset ingested.
///
/// Any dataset that fails to load fails the whole open.
pub async fn open_workbench(config: &WorkbenchConfig) -> Result<Session<SqliteEngine>> {
    let prepared = prepare_engine(config).await?;
    if let Some(e) = prepared.load_error {
        return Err(e);
    }

    let mut session = Session::new(config.initial_query.clone());
    session.attach_engine(prepared.engine);
    let outcomes = session.ingest(&prepared.datasets)?;
    info!(datasets = outcomes.len(), "Workbench ready");

    Ok(session)
}

/// Prepare the engine and attach it to a session that is already in use.
///
/// Statements executed before this completes fail with `EngineNotReady`.
/// The engine is attached and the datasets ingested under one lock, so no
/// statement sees a partially ingested engine. Once the engine has started
/// it stays attached: datasets that loaded are ingested and a load failure
/// is returned afterwards.
pub async fn load_into(
    session: SharedSession<SqliteEngine>,
    config: WorkbenchConfig,
) -> Result<Vec<IngestOutcome>> {
    let prepared = prepare_engine(&config).await?;

    let mut session = session.lock();
    session.attach_engine(prepared.engine);
    let outcomes = session.ingest(&prepared.datasets)?;
    info!(datasets = outcomes.len(), "Workbench ready");

    match prepared.load_error {
        Some(e) => Err(e),
        None => Ok(outcomes),
    }
}
