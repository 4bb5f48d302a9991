//! Configuration merging utilities
//!
//! This module provides functions to merge configuration from files
//! with command-line arguments, where CLI arguments take precedence.

use super::args::WorkbenchArgs;
use super::file::ConfigFile;
use super::*;

/// Merge configuration file values with CLI arguments.
/// CLI arguments take precedence over config file values.
/// Only applies config file values where CLI uses defaults.
/// Datasets from the file are appended after the CLI datasets.
pub fn merge_config_with_args(mut args: WorkbenchArgs, config: &ConfigFile) -> WorkbenchArgs {
    // Helper macro to apply config value if CLI is at default
    macro_rules! apply_if_default {
        ($field:ident, $config_val:expr, $default:expr) => {
            if let Some(val) = $config_val {
                if args.$field == $default {
                    args.$field = val;
                }
            }
        };
    }

    macro_rules! apply_if_default_string {
        ($field:ident, $config_val:expr, $default:expr) => {
            if let Some(ref val) = $config_val {
                if args.$field == $default {
                    args.$field = val.clone();
                }
            }
        };
    }

    let section = &config.workbench;
    apply_if_default_string!(log_level, section.log_level, DEFAULT_LOG_LEVEL);
    apply_if_default_string!(initial_query, section.initial_query, DEFAULT_INITIAL_QUERY);
    apply_if_default!(format, section.format, OutputFormat::Table);
    apply_if_default!(max_rows, section.max_rows, DEFAULT_MAX_ROWS);

    if args.data_dir.is_none() {
        args.data_dir = section.data_dir.clone();
    }
    if section.color == Some(false) {
        args.no_color = true;
    }

    args.datasets
        .extend(config.datasets.iter().map(|entry| entry.to_source_spec()));

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn file(toml: &str) -> ConfigFile {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_file_fills_defaults() {
        let args = WorkbenchArgs::parse_from(["csvql"]);
        let config = file(
            r#"
            [workbench]
            log_level = "debug"
            max_rows = 25
            format = "csv"
            data_dir = "./csv"
            color = false
            "#,
        );

        let merged = merge_config_with_args(args, &config);
        assert_eq!(merged.log_level, "debug");
        assert_eq!(merged.max_rows, 25);
        assert_eq!(merged.format, OutputFormat::Csv);
        assert_eq!(merged.data_dir, Some(std::path::PathBuf::from("./csv")));
        assert!(merged.no_color);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let args = WorkbenchArgs::parse_from(["csvql", "--max-rows", "7", "--log-level", "error"]);
        let config = file(
            r#"
            [workbench]
            log_level = "debug"
            max_rows = 25
            "#,
        );

        let merged = merge_config_with_args(args, &config);
        assert_eq!(merged.max_rows, 7);
        assert_eq!(merged.log_level, "error");
    }

    #[test]
    fn test_datasets_are_concatenated() {
        let args = WorkbenchArgs::parse_from(["csvql", "-d", "a.csv"]);
        let config = file(
            r#"
            [[datasets]]
            name = "b"
            path = "b.csv"
            "#,
        );

        let merged = merge_config_with_args(args, &config);
        assert_eq!(merged.datasets, vec!["a.csv", "b=b.csv"]);
    }
}
