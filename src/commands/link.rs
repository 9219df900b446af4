//! `arolink link` command.

use std::path::Path;

use chrono::Utc;

use crate::category::Pipeline;
use crate::context::LinkContext;
use crate::emit::{self, Manifest};

/// Execute the `link` command: scan `<project>/src`, resolve, and emit into
/// `<project>/gen` along with a `manifest.yaml` run summary.
///
/// # Errors
///
/// Returns an error string when any scan, resolution, or emission step
/// fails; nothing has been written in the scan/resolve case.
pub fn run(project: &Path) -> Result<(), String> {
    let gen_root = project.join("gen");
    let pipeline = Pipeline::standard();
    let mut ctx = LinkContext::new(project.join("src"));

    pipeline.run(&mut ctx).map_err(|e| e.to_string())?;
    let report = pipeline.emit(&ctx, &gen_root).map_err(|e| e.to_string())?;

    let manifest = Manifest { generated_at: Utc::now(), keys: report.keys.clone() };
    emit::write_manifest(&gen_root.join("manifest.yaml"), &manifest)
        .map_err(|e| e.to_string())?;

    println!("Linked {} keys across {} categories", report.total(), report.keys.len());
    Ok(())
}
