//! CLI interface for shelfdex.
//!
//! Provides command-line argument parsing using clap.

use clap::{Parser, Subcommand};

/// Command-line interface for shelfdex.
#[derive(Parser)]
#[command(name = "shelfdex")]
#[command(author, version, about = "Searchable record catalog", long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog with exact, wildcard and fuzzy matching.
    Search {
        /// The search pattern.
        pattern: String,

        /// Maximum number of results to return (defaults to the config value).
        #[arg(short, long)]
        limit: Option<usize>,

        /// Field to search; repeat for several. Defaults to every schema field.
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List all records in the catalog.
    List,

    /// Print every stored field of a record.
    Get {
        /// Value of the record's `id` field.
        id: String,
    },

    /// Start the MCP server for AI editor integration.
    #[cfg(feature = "mcp")]
    Serve,
}
