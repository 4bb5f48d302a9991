//! Error types for csvql
//!
//! A single crate-wide error enum with structured sub-domains for dataset
//! loading and engine execution.

use thiserror::Error;

mod domain;
mod hints;

pub use domain::{EngineError, LoadError};
pub use hints::ErrorHint;

/// Result type alias for csvql operations
pub type Result<T> = std::result::Result<T, CsvqlError>;

/// Main error type for csvql
#[derive(Error, Debug)]
pub enum CsvqlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A raw dataset could not be fetched or parsed
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// The embedded engine rejected a statement
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// A statement was submitted before the engine finished starting
    #[error("Database loading not finished yet")]
    EngineNotReady,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input error: {0}")]
    Readline(String),

    #[error("Task failed: {0}")]
    Task(String),
}

impl CsvqlError {
    /// Create a configuration error for a specific setting
    pub fn config(setting: &str, reason: impl Into<String>) -> Self {
        CsvqlError::Config(format!("{}: {}", setting, reason.into()))
    }

    /// Returns true if this error came from a user statement the engine rejected
    pub fn is_statement_failure(&self) -> bool {
        matches!(self, CsvqlError::Engine(EngineError::Statement(_)))
    }
}

impl From<rustyline::error::ReadlineError> for CsvqlError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CsvqlError::Readline(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CsvqlError {
    fn from(err: tokio::task::JoinError) -> Self {
        CsvqlError::Task(err.to_string())
    }
}
