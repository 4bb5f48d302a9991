//! Configuration module for csvql
//!
//! - `defaults` - Default constants and values
//! - `args` - CLI argument definitions
//! - `file` - TOML configuration file
//! - `merge` - File values applied under CLI values

mod args;
mod defaults;
pub mod file;
mod merge;

pub use args::WorkbenchArgs;
pub use defaults::*;
pub use file::ConfigFile;
pub use merge::merge_config_with_args;

use std::path::PathBuf;

use crate::error::{CsvqlError, Result};
use crate::ingest::DatasetSource;
use crate::render::OutputFormat;

/// Resolved settings for one workbench session.
///
/// # Configuration Sources
///
/// 1. **CLI arguments** (highest priority)
/// 2. **Environment variables** - `CSVQL_*` prefix
/// 3. **Config file** - `csvql.toml`
/// 4. **Built-in defaults** (lowest priority)
#[derive(Debug, Clone)]
pub struct WorkbenchConfig {
    /// Explicit dataset sources, in the order given
    pub datasets: Vec<DatasetSource>,

    /// Directory scanned for additional `*.csv` sources
    pub data_dir: Option<PathBuf>,

    /// One-shot statement; the interactive shell is skipped when set
    pub command: Option<String>,

    pub initial_query: String,

    pub format: OutputFormat,

    pub max_rows: usize,

    pub log_level: String,

    pub color: bool,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            datasets: Vec::new(),
            data_dir: None,
            command: None,
            initial_query: DEFAULT_INITIAL_QUERY.to_string(),
            format: OutputFormat::default(),
            max_rows: DEFAULT_MAX_ROWS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            color: true,
        }
    }
}

impl WorkbenchConfig {
    /// Validate parsed arguments into a session configuration
    pub fn from_args(args: WorkbenchArgs) -> Result<Self> {
        if args.max_rows == 0 {
            return Err(CsvqlError::config("max_rows", "must be greater than zero"));
        }

        let datasets = args
            .datasets
            .iter()
            .map(|spec| DatasetSource::parse(spec))
            .collect::<Result<Vec<_>>>()?;

        if let Some(ref dir) = args.data_dir {
            if !dir.is_dir() {
                return Err(CsvqlError::config(
                    "data_dir",
                    format!("not a directory: {}", dir.display()),
                ));
            }
        }

        Ok(Self {
            datasets,
            data_dir: args.data_dir,
            command: args.command,
            initial_query: args.initial_query,
            format: args.format,
            max_rows: args.max_rows,
            log_level: args.log_level,
            color: !args.no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_args_defaults() {
        let config = WorkbenchConfig::from_args(WorkbenchArgs::parse_from(["csvql"])).unwrap();
        assert!(config.datasets.is_empty());
        assert_eq!(config.initial_query, "SELECT * FROM users;");
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
        assert!(config.color);
    }

    #[test]
    fn test_from_args_parses_datasets() {
        let args = WorkbenchArgs::parse_from(["csvql", "-d", "people=users.csv", "-d", "orders.csv"]);
        let config = WorkbenchConfig::from_args(args).unwrap();
        let names: Vec<&str> = config.datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["people", "orders"]);
    }

    #[test]
    fn test_zero_max_rows_rejected() {
        let args = WorkbenchArgs::parse_from(["csvql", "--max-rows", "0"]);
        let err = WorkbenchConfig::from_args(args).unwrap_err();
        assert!(err.to_string().contains("max_rows"));
    }

    #[test]
    fn test_invalid_dataset_rejected() {
        let args = WorkbenchArgs::parse_from(["csvql", "-d", "=x.csv"]);
        assert!(WorkbenchConfig::from_args(args).is_err());
    }

    #[test]
    fn test_missing_data_dir_rejected() {
        let args = WorkbenchArgs::parse_from(["csvql", "--data-dir", "/nonexistent/csvql-data"]);
        assert!(WorkbenchConfig::from_args(args).is_err());
    }
}
