//! Binary entrypoint for the `arolink` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match arolink::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
