//! csvql CLI utilities
//!
//! - `repl`: interactive shell over a workbench session

pub mod repl;

pub use repl::{run_repl, ReplConfig};
