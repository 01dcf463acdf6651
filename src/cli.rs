//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `vcrkit`.
#[derive(Debug, Parser)]
#[command(name = "vcrkit", version, about = "Inspect and maintain HTTP cassettes")]
pub struct Cli {
    /// Log filter directive, e.g. `debug` or `vcrkit=trace`. Overrides `RUST_LOG`.
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the interactions stored in a cassette file.
    Show {
        /// Cassette file to read.
        cassette: PathBuf,
    },
    /// Rewrite a cassette file in the current schema.
    Migrate {
        /// Cassette file to rewrite in place.
        cassette: PathBuf,
    },
    /// Re-apply configured filters to every stored interaction.
    Redact {
        /// Cassette file to rewrite in place.
        cassette: PathBuf,
        /// YAML config holding the filters.
        #[arg(long, short)]
        config: PathBuf,
    },
    /// Print the file name a cassette name maps to.
    Sanitize {
        /// Cassette name as passed to a session.
        name: String,
    },
}
