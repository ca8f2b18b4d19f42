//! CLI argument definitions using clap
//!
//! Commands:
//! - fieldcheck validate --schema <path> [--input <path>] [--canonical]
//! - fieldcheck batch --schema <path> [--canonical]
//! - fieldcheck schemas [--dir <path>]
//!
//! `--config <path>` is accepted by every command.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fieldcheck - validate records against aliased, typed field schemas
#[derive(Parser, Debug)]
#[command(name = "fieldcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one JSON record (stdin unless --input is given)
    Validate {
        /// Path to the schema file
        #[arg(long)]
        schema: PathBuf,

        /// Read the record from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,

        /// Key accepted records by canonical name instead of alias
        #[arg(long)]
        canonical: bool,
    },

    /// Validate one JSON record per stdin line
    Batch {
        /// Path to the schema file
        #[arg(long)]
        schema: PathBuf,

        /// Key accepted records by canonical name instead of alias
        #[arg(long)]
        canonical: bool,
    },

    /// Load every schema in the schema directory and list them
    Schemas {
        /// Schema directory; overrides the config file
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_validate() {
        let cli = Cli::parse_from([
            "fieldcheck",
            "validate",
            "--schema",
            "aliased.json",
            "--canonical",
            "--config",
            "fc.json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("fc.json")));
        match cli.command {
            Command::Validate {
                schema,
                input,
                canonical,
            } => {
                assert_eq!(schema, PathBuf::from("aliased.json"));
                assert!(input.is_none());
                assert!(canonical);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_required() {
        assert!(Cli::try_parse_from(["fieldcheck", "batch"]).is_err());
    }
}
