//! csvql - query CSV files with SQL
//!
//! Loads the configured datasets into an in-memory database and either runs
//! a single statement (`-c`) or starts the interactive shell.

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use csvql::cli_utils::run_repl;
use csvql::config::{merge_config_with_args, ConfigFile};
use csvql::render::render_result;
use csvql::{open_workbench, CsvqlError, ErrorHint, Result, WorkbenchArgs, WorkbenchConfig};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.with_hint());
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse command-line arguments (before runtime creation)
    let mut args = WorkbenchArgs::parse();

    // Handle --generate-config flag
    if args.generate_config {
        println!("{}", ConfigFile::generate_example());
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration file if specified or from default locations
    let config_file = match args.config {
        Some(ref path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::load_default(),
    };

    // Merge config file values with CLI args (CLI takes precedence)
    if let Some(ref config) = config_file {
        args = merge_config_with_args(args, config);
    }

    // Logs go to stderr so results on stdout stay clean
    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter)
        .init();

    if config_file.is_some() {
        info!("Configuration loaded from file");
    }

    let config = match WorkbenchConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to create configuration");
            return Err(e);
        }
    };

    if !config.color {
        colored::control::set_override(false);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CsvqlError::Task(format!("Failed to create Tokio runtime: {}", e)))?;

    match config.command.clone() {
        Some(statement) => runtime.block_on(run_command(&config, statement)),
        None => {
            run_repl(&config, runtime.handle())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load everything, run one statement, print its result
async fn run_command(config: &WorkbenchConfig, statement: String) -> Result<ExitCode> {
    let mut session = open_workbench(config).await?;
    debug!(statement = %statement, "Running one-shot statement");

    match session.execute_text(statement) {
        Ok(result) => {
            println!("{}", render_result(result, config.format, config.color)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.with_hint());
            Ok(ExitCode::from(1))
        }
    }
}
