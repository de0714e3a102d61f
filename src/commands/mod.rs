//! Command handlers.

pub mod check;

use crate::cli::Cli;
use crate::context::ServiceContext;

/// Dispatch parsed arguments to the check command using the live filesystem.
///
/// # Errors
///
/// Returns an error string if any pipeline fails to check.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let ctx = ServiceContext::live();
    check::run_with_context(&ctx, cli)
}
