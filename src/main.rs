//! Binary entrypoint for the `pipecheck` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match pipecheck::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
