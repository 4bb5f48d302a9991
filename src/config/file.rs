//! TOML configuration file support
//!
//! Example configuration file:
//! ```toml
//! [workbench]
//! log_level = "info"
//! format = "table"
//! max_rows = 10000
//! initial_query = "SELECT * FROM users;"
//! # data_dir = "./data"
//!
//! [[datasets]]
//! name = "users"
//! path = "data/users.csv"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::defaults::CONFIG_FILE_NAME;
use crate::error::{CsvqlError, Result};
use crate::ingest::DatasetSource;
use crate::render::OutputFormat;

/// Root configuration structure for TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Shell and engine settings
    pub workbench: WorkbenchSection,

    /// Datasets loaded at start-up
    pub datasets: Vec<DatasetEntry>,
}

/// Workbench section configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkbenchSection {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,

    /// Output format (table, json, csv)
    pub format: Option<OutputFormat>,

    /// Maximum rows collected from a single statement
    pub max_rows: Option<usize>,

    /// Statement preloaded into the edit buffer
    pub initial_query: Option<String>,

    /// Directory whose *.csv files are all loaded
    pub data_dir: Option<PathBuf>,

    /// Colored output
    pub color: Option<bool>,
}

/// One `[[datasets]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    /// Table name; the file stem when omitted
    pub name: Option<String>,
    pub path: PathBuf,
}

impl DatasetEntry {
    /// The entry in `--dataset` form (`name=path`).
    ///
    /// An entry whose name cannot be derived is returned as the bare path so
    /// that source validation reports it.
    pub fn to_source_spec(&self) -> String {
        match &self.name {
            Some(name) => format!("{}={}", name, self.path.display()),
            None => DatasetSource::from_path(&self.path)
                .map(|source| source.to_string())
                .unwrap_or_else(|_| self.path.display().to_string()),
        }
    }
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CsvqlError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            CsvqlError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Try to load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./csvql.toml
    /// 2. ~/.config/csvql/csvql.toml (platform config dir)
    pub fn load_default() -> Option<Self> {
        let default_paths = [
            PathBuf::from(CONFIG_FILE_NAME),
            dirs::config_dir()
                .map(|p| p.join("csvql").join(CONFIG_FILE_NAME))
                .unwrap_or_default(),
        ];

        for path in default_paths.iter().filter(|p| !p.as_os_str().is_empty()) {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        None
    }

    /// Generate an example configuration file
    pub fn generate_example() -> String {
        r#"# csvql Configuration File
# Copy to csvql.toml and customize as needed
#
# Configuration priority (highest to lowest):
# 1. Command-line arguments
# 2. Environment variables (CSVQL_*)
# 3. This configuration file
# 4. Default values

[workbench]
# Log level (trace, debug, info, warn, error)
log_level = "warn"

# Output format for query results (table, json, csv)
format = "table"

# Maximum rows collected from a single statement
max_rows = 10000

# Statement preloaded into the edit buffer of the interactive shell
initial_query = "SELECT * FROM users;"

# Load every *.csv file in this directory
# data_dir = "./data"

# Colored output
color = true

# Datasets to load at start-up. The table name defaults to the file stem.
# [[datasets]]
# name = "users"
# path = "data/users.csv"
#
# [[datasets]]
# path = "data/orders.csv"
"#
        .to_string()
    }
}
