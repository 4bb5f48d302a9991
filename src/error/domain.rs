//! Domain-specific error types for csvql

use thiserror::Error;

/// Structured dataset loading error domain
#[derive(Debug, Error, Clone)]
pub enum LoadError {
    #[error("failed to read {path}: {detail}")]
    Read { path: String, detail: String },
    #[error("failed to parse {path}: {detail}")]
    Parse { path: String, detail: String },
    #[error("invalid dataset source '{0}'")]
    InvalidSource(String),
}

impl LoadError {
    pub fn read(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn parse(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_source(source: impl Into<String>) -> Self {
        Self::InvalidSource(source.into())
    }
}

/// Structured engine error domain
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// Failure during an engine-internal step (open, catalog lookup, ingestion)
    #[error("{operation}: {detail}")]
    Operation { operation: String, detail: String },
    /// A user statement was rejected; the text is shown to the user as-is
    #[error("{0}")]
    Statement(String),
}

impl EngineError {
    pub fn operation(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    pub fn statement(detail: impl Into<String>) -> Self {
        Self::Statement(detail.into())
    }
}
