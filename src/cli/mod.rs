//! Command-line parsing for the GPU earnings comparison.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/merge code. Flags override the environment (see `config`).

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::FailurePolicy;
use crate::view::{DemandFilter, SortColumn, SortDirection};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gpuc", version, about = "Compare GPU earnings (Salad) with rental prices (Vast.ai)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a run summary and the comparison table; optionally export it.
    Table(TableArgs),
    /// Print the merged records as a JSON array (the `/api/gpu-data` body).
    Json(SourceArgs),
    /// Show earnings estimates for the first three GPUs matching a term.
    Search(SearchArgs),
    /// Serve the merged data over HTTP.
    Serve(ServeArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same fetch + merge pipeline as `gpuc table`, rendered as a
    /// sortable, filterable table with a per-GPU rate chart.
    Tui(SourceArgs),
}

/// Where the two feeds come from, and how failures are handled.
#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// Source A (earnings) URL.
    #[arg(long, value_name = "URL", conflicts_with = "salad_file")]
    pub salad_url: Option<String>,

    /// Read source A from a saved JSON response instead of the network.
    #[arg(long, value_name = "JSON")]
    pub salad_file: Option<PathBuf>,

    /// Source B (rental prices) URL.
    #[arg(long, value_name = "URL", conflicts_with = "vast_file")]
    pub vast_url: Option<String>,

    /// Read source B from a saved JSON response instead of the network.
    #[arg(long, value_name = "JSON")]
    pub vast_file: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// What to do when a feed fails: degrade to an empty list, or abort.
    #[arg(long, value_enum)]
    pub policy: Option<FailurePolicy>,

    /// Write a match diagnostics bundle under `debug/`.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Column to sort by.
    #[arg(long, value_enum, default_value_t = SortColumn::Name)]
    pub sort: SortColumn,

    /// Sort direction.
    #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
    pub direction: SortDirection,

    /// Case-insensitive text filter on the GPU name.
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Only show one demand tier.
    #[arg(long, value_enum, default_value_t = DemandFilter::All)]
    pub demand: DemandFilter,

    /// Export the full merged array to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export the full merged table to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    /// GPU name fragment (at least 3 characters).
    pub term: String,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Address to listen on.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}
