//! Core library for the `arolink` module linker.
//!
//! Modules are organized by filesystem convention: `@defines` declares
//! implementation units, `@replaces` overrides existing bindings, and
//! `@composites` groups ordered member references. The pipeline scans the
//! tree, resolves everything into an identifier registry, and emits
//! import-redirect artifacts for the downstream build.

pub mod category;
pub mod cli;
pub mod commands;
pub mod composite;
pub mod context;
pub mod emit;
pub mod error;
pub mod priority;
pub mod registry;
pub mod replace;
pub mod scanner;
pub mod uid;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution
/// fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command)
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn run_errors_on_unknown_subcommand() {
        let result = run(["arolink", "unknown"]);
        assert!(result.is_err());
    }

    #[test]
    fn run_errors_on_missing_project() {
        let missing = std::env::temp_dir().join(format!("arolink_lib_{}", uuid::Uuid::new_v4()));
        let args =
            vec!["arolink".to_string(), "check".to_string(), "--project".to_string(), missing.display().to_string()];
        let result = run(args);
        assert!(result.is_err());
    }
}
