//! Command-line arguments for csvql
//!
//! This module defines the CLI arguments structure using clap.

use clap::Parser;
use std::path::PathBuf;

use super::defaults::*;
use crate::render::OutputFormat;

/// Command-line arguments for csvql
#[derive(Parser, Debug, Clone)]
#[command(name = "csvql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Load CSV files into an in-memory SQL database and query them")]
pub struct WorkbenchArgs {
    /// Path to configuration file (TOML format)
    /// If not specified, looks for csvql.toml in the current directory,
    /// then in the user config directory (e.g. ~/.config/csvql/)
    #[arg(long, env = "CSVQL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Generate example configuration file and exit
    #[arg(long)]
    pub generate_config: bool,

    /// CSV dataset to load, as `name=path.csv` or `path.csv` (table named
    /// after the file stem). May be repeated.
    #[arg(
        short = 'd',
        long = "dataset",
        value_name = "SOURCE",
        env = "CSVQL_DATASETS",
        value_delimiter = ','
    )]
    pub datasets: Vec<String>,

    /// Load every *.csv file in this directory
    #[arg(long, env = "CSVQL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Execute a single statement, print the result and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Statement preloaded into the edit buffer of the interactive shell
    #[arg(long, env = "CSVQL_INITIAL_QUERY", default_value = DEFAULT_INITIAL_QUERY)]
    pub initial_query: String,

    /// Output format for query results
    #[arg(long, env = "CSVQL_FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Maximum rows collected from a single statement
    #[arg(long, env = "CSVQL_MAX_ROWS", default_value_t = DEFAULT_MAX_ROWS)]
    pub max_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CSVQL_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, env = "CSVQL_NO_COLOR")]
    pub no_color: bool,
}
