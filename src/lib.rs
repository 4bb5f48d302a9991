#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # csvql
//!
//! csvql loads CSV files into an in-memory SQLite database and lets you query
//! them from an interactive shell.
//!
//! ## Features
//!
//! - **Typed tables**: each column is stored as `INTEGER`, `DECIMAL` or
//!   `VARCHAR`, decided from every value in the column
//! - **Load once**: a dataset whose table already exists is never reloaded
//! - **Recall**: Up/Down walk the statements executed in the session and
//!   restore the text being typed when you come back
//! - **Output**: results as a table, JSON or CSV
//!
//! ## Quick Start
//!
//! ```bash
//! $ csvql --dataset data/users.csv --dataset orders=data/orders_2024.csv
//! csvql> SELECT name, COUNT(*) FROM users JOIN orders ON orders.user_id = users.id GROUP BY name;
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use csvql::{open_workbench, Result, WorkbenchConfig};
//! use csvql::ingest::DatasetSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = WorkbenchConfig {
//!         datasets: vec![DatasetSource::parse("data/users.csv")?],
//!         ..Default::default()
//!     };
//!     let mut session = open_workbench(&config).await?;
//!
//!     let result = session.execute_text("SELECT * FROM users;")?;
//!     println!("{:?}", result.columns);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ingest`]: type inference, statement generation, CSV loading, ingestion
//! - [`engine`]: the embedded engine interface and its SQLite implementation
//! - [`history`]: statement history and recall navigation
//! - [`projection`]: display-ready result tables
//! - [`session`]: per-user session state
//! - [`render`]: table, JSON and CSV output

pub mod cli_utils;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod ingest;
pub mod projection;
pub mod render;
pub mod session;

pub use config::{WorkbenchArgs, WorkbenchConfig};
pub use engine::{Engine, Row, SqliteEngine, Value};
pub use error::{CsvqlError, ErrorHint, Result};
pub use history::{HistoryLog, NavState, Navigator, QueryEditor};
pub use ingest::{ingest, ingest_all, IngestOutcome, RawDataset, RawRow};
pub use projection::{project, ResultTable};
pub use render::OutputFormat;
pub use session::{open_workbench, Session};
