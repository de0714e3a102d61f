//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Top-level CLI parser for `pipecheck`.
#[derive(Debug, Parser)]
#[command(
    name = "pipecheck",
    version,
    about = "Check CI pipelines for task param parity and input availability"
)]
pub struct Cli {
    /// Path to a pipeline file. Repeat to check several pipelines in turn.
    #[arg(short, long = "pipeline", value_name = "PATH", required = true)]
    pub pipelines: Vec<PathBuf>,

    /// Path to a config file holding the `resource_map`.
    #[arg(short, long, value_name = "PATH", env = "PIPECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Keep checking the remaining pipelines after one fails.
    #[arg(short, long)]
    pub keep_going: bool,

    /// Log engine decisions to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// How failures (and, for JSON, successes) are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable report on stderr.
    Text,
    /// One JSON object per pipeline on stdout.
    Json,
}
