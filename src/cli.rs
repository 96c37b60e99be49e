//! CLI definitions for hintkit.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hintkit_protocols::ElementType;

/// hintkit CLI.
#[derive(Parser)]
#[command(name = "hintkit")]
#[command(about = "Element tracking engine for keyboard-driven link hints")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.hintkit/hintkit.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the elements of a page snapshot that get hints
    Scan {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Only these element types (comma separated)
        #[arg(long = "type", value_delimiter = ',')]
        types: Vec<ElementType>,

        /// Text selection mode
        #[arg(long, conflicts_with = "types")]
        selectable: bool,

        /// Process the change queue in idle slices of this many
        /// milliseconds before querying
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        slice_ms: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show engine statistics after processing a page snapshot
    Stats {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Validate the configuration file
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
