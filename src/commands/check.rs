//! The check command: runs the engine over each pipeline in turn.

use std::io::Write;

use crate::cli::{Cli, Format};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::engine::Checker;
use crate::report;

/// Execute the check command.
///
/// Without `--keep-going` the first failing pipeline ends the run and its
/// report becomes the error. With it, every pipeline is checked and the
/// reports are printed as they are produced, unless a malformed plan ends
/// the run anyway.
///
/// # Errors
///
/// Returns an error string if the config cannot be loaded or any pipeline fails.
pub fn run_with_context(ctx: &ServiceContext, cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => Config::load(ctx, path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let mut checker = Checker::new(ctx, &config.resource_map);
    let mut failed = 0;

    for path in &cli.pipelines {
        let outcome = checker.check_file(path);

        if cli.format == Format::Json {
            let line = report::render_json(path, &outcome).map_err(|e| e.to_string())?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{line}").map_err(|e| format!("failed to write report: {e}"))?;
        }

        let Err(err) = outcome else {
            continue;
        };
        tracing::debug!(pipeline = %path.display(), code = err.code(), "pipeline failed");
        failed += 1;

        if !cli.keep_going || err.aborts_run() {
            return Err(match cli.format {
                Format::Text => report::render_text(path, &err),
                Format::Json => format!("{} failed", path.display()),
            });
        }
        if cli.format == Format::Text {
            eprintln!("{}", report::render_text(path, &err));
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} pipelines failed", cli.pipelines.len()));
    }
    Ok(())
}
