//! Command-line argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Rebase url() references in compiled CSS using its source map.
#[derive(Debug, Parser)]
#[command(name = "css-rebaser")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Compiled stylesheet to rebase
    pub input: Utf8PathBuf,

    /// Source map of the input (defaults to a map embedded in the stylesheet)
    #[arg(long)]
    pub map: Option<Utf8PathBuf>,

    /// Where to write the rebased stylesheet (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Where to write the projected source map
    #[arg(long)]
    pub map_output: Option<Utf8PathBuf>,

    /// Directory that absolute source paths are made relative to
    #[arg(long)]
    pub base_dir: Option<Utf8PathBuf>,

    /// Config file (defaults to css-rebase.json in the working directory)
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Format of the rebase report written to stderr
    #[arg(long, value_enum, default_value = "human")]
    pub report: ReportFormat,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Rebase report formats.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// One `raw -> rebased` line per rewrite (default)
    #[default]
    Human,
    /// JSON array of records
    Json,
}
