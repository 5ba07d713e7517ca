//! Lorekeeper CLI library.
//!
//! Argument parsing, command execution and output formatting for the
//! `lorekeeper` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod runtime;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
pub use runtime::block_on_bounded;
