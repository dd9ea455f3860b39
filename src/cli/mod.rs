//! CLI module for flatdb
//!
//! Provides command-line access to one store:
//! - insert: append records read from stdin
//! - find / count: run a query
//! - delete: tombstone matching records
//! - dump: line counts by marker

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, load_config, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, write_json};
