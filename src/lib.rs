//! Core library entry for the `pipecheck` CLI.
//!
//! `pipecheck` statically checks CI pipeline definitions before they are
//! deployed. For every task step it verifies that the params the invocation
//! passes match the params the task declares, and that every input the task
//! requires has been produced by an earlier step of the same job.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod report;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub use error::{Error, Result};

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or any pipeline fails
/// its checks.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    init_logging(cli.verbose);
    commands::dispatch(&cli)
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` over `warn`.
fn init_logging(verbose: bool) {
    let default = if verbose { "pipecheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Fails only when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_without_pipeline() {
        let result = run(["pipecheck"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_unknown_flag() {
        let result = run(["pipecheck", "-p", "x.yml", "--bogus"]);
        assert!(result.unwrap_err().contains("--bogus"));
    }

    #[test]
    fn run_reports_unreadable_pipeline() {
        let result = run(["pipecheck", "-p", "/definitely/not/here/pipeline.yml"]);
        assert!(result.unwrap_err().contains("failed to read pipeline"));
    }
}
