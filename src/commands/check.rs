//! `arolink check` command.

use std::path::Path;

use crate::category::Pipeline;
use crate::context::LinkContext;

/// Execute the `check` command: run the scan and resolve stages without
/// emitting, then print a summary of what would be linked.
///
/// The scan side effects (identifier assignment, marker stamping) still
/// apply; only artifact emission is skipped.
///
/// # Errors
///
/// Returns an error string on the first validation failure.
pub fn run(project: &Path) -> Result<(), String> {
    let pipeline = Pipeline::standard();
    let mut ctx = LinkContext::new(project.join("src"));
    pipeline.run(&mut ctx).map_err(|e| e.to_string())?;

    println!(
        "Check passed: {} keys ({} items), {} replace rules, {} composites",
        ctx.registry.key_count(),
        ctx.registry.item_count(),
        ctx.replaces.len(),
        ctx.composites.len(),
    );
    Ok(())
}
