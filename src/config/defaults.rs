//! Default constants for csvql configuration
//!
//! These constants define the default values used throughout the configuration
//! system when no explicit value is provided.

/// Statement preloaded into the edit buffer at start-up
pub const DEFAULT_INITIAL_QUERY: &str = "SELECT * FROM users;";

/// Default log level. The shell stays quiet unless asked otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Default cap on rows collected from a single statement
pub const DEFAULT_MAX_ROWS: usize = crate::engine::DEFAULT_MAX_ROWS;

/// Config file name searched for in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "csvql.toml";

/// Prompt shown by the interactive shell
pub const DEFAULT_PROMPT: &str = "csvql> ";
