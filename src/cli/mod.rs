//! CLI module for fieldcheck
//!
//! Provides command-line interface for:
//! - validate: Validate one record
//! - batch: Validate one record per line
//! - schemas: List schemas in the schema directory

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{batch, run, run_command, schemas, validate};
pub use config::{Config, OutputKeys};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_record, read_records, write_error, write_rejected, write_response};
