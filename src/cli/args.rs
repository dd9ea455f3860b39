//! CLI argument definitions using clap
//!
//! Commands:
//! - flatdb insert              (records on stdin, one JSON object per line)
//! - flatdb find --query <json> [--sort <json>] [--projection <json>]
//! - flatdb count --query <json>
//! - flatdb delete --query <json>
//! - flatdb dump

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// flatdb - an embedded document store over one JSON-lines file
#[derive(Parser, Debug)]
#[command(name = "flatdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./flatdb.json")]
    pub config: PathBuf,

    /// Log every event to stderr, overriding the configured level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append records read from stdin
    Insert,

    /// Print matching records
    Find {
        /// Query object
        #[arg(long, default_value = "{}")]
        query: String,

        /// Sort object, e.g. {"age": 1, "name": -1}
        #[arg(long)]
        sort: Option<String>,

        /// Projection object, e.g. {"name": 1}
        #[arg(long)]
        projection: Option<String>,
    },

    /// Print the number of matching records
    Count {
        /// Query object
        #[arg(long, default_value = "{}")]
        query: String,
    },

    /// Tombstone matching records
    Delete {
        /// Query object (required; use {} to delete everything)
        #[arg(long)]
        query: String,
    },

    /// Print line counts by marker
    Dump,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
