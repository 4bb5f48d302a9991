//! Error hints for actionable error messages

use super::{CsvqlError, EngineError, LoadError};

/// Extension trait for adding hints to errors
pub trait ErrorHint {
    /// Get a helpful hint for resolving this error
    fn hint(&self) -> Option<String>;

    /// Format the error with hint for display
    fn with_hint(&self) -> String;
}

impl ErrorHint for CsvqlError {
    fn hint(&self) -> Option<String> {
        match self {
            CsvqlError::EngineNotReady => Some(
                "The datasets are still being loaded. Run the statement again once loading completes".into(),
            ),
            CsvqlError::Engine(EngineError::Statement(msg)) if msg.contains("no such table") => Some(
                "List the loaded tables with `.tables`, or load another CSV with `--dataset name=path.csv`".into(),
            ),
            CsvqlError::Engine(EngineError::Statement(msg)) if msg.contains("no such column") => Some(
                "Column names are sanitized on load: characters outside [A-Za-z0-9] become '_'".into(),
            ),
            CsvqlError::Engine(EngineError::Statement(msg)) if msg.contains("syntax error") => Some(
                "Check the statement syntax. Statements use the SQLite dialect".into(),
            ),
            CsvqlError::Load(LoadError::Read { .. }) => {
                Some("Check that the CSV path exists and is readable".into())
            }
            CsvqlError::Load(LoadError::Parse { .. }) => {
                Some("Datasets must be comma-separated with a header row".into())
            }
            CsvqlError::Load(LoadError::InvalidSource(_)) => {
                Some("Use `--dataset path.csv` or `--dataset name=path.csv`".into())
            }
            CsvqlError::Config(_) => Some(
                "Generate an example configuration with: `csvql --generate-config`".into(),
            ),
            _ => None,
        }
    }

    fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}
