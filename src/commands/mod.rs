//! Command dispatch and handlers.

pub mod check;
pub mod link;

use crate::cli::Command;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Link { project } => link::run(project),
        Command::Check { project } => check::run(project),
    }
}
