//! Command-line arguments.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Manage the bookshop database: publishers, books, shops, stock and sales.
#[derive(Debug, Parser)]
#[command(name = "bookshop", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults to the per-user configuration directory
    #[arg(long, global = true, env = "BOOKSHOP_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Increase log output (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create any missing tables
    Init,
    /// Create any missing tables, then insert the sample data set
    Seed,
    /// Exit with an error unless the table exists
    Check {
        table: String,
    },
    /// Print every row of an existing table
    List {
        table: String,
    },
    /// List the shops stocking books from a publisher
    Shops {
        /// Publisher name; read from standard input when omitted
        #[arg(short, long)]
        publisher: Option<String>,
    },
}

impl Cli {
    /// Default log filter for the requested verbosity, used when `RUST_LOG`
    /// is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
