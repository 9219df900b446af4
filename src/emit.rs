//! Artifact writers: import-redirect files, composite barrels, and the run
//! manifest.
//!
//! Generated redirects are plain files rather than symlinks so the output
//! works identically on every platform and survives archive round-trips.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::LinkError;

/// Output-location context handed to every finalize hook.
#[derive(Debug, Clone)]
pub struct EmitContext {
    /// Root directory all artifacts are written under.
    pub output_root: PathBuf,
}

/// Summary of one run, written to `manifest.yaml` in the output root.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// When the artifacts were generated.
    pub generated_at: DateTime<Utc>,
    /// Emitted key count per category kind.
    pub keys: BTreeMap<String, usize>,
}

/// Writes an import-redirect file at `artifact` pointing at `target`.
///
/// # Errors
///
/// Returns [`LinkError::Io`] when directories cannot be created or the file
/// cannot be written.
pub fn write_redirect(artifact: &Path, target: &Path) -> Result<(), LinkError> {
    let parent = ensure_parent(artifact)?;
    let import = import_path(&relative_path(&parent, target));
    let content = format!("import D from \"{import}\";\nexport default D;\n");
    fs::write(artifact, content).map_err(|e| LinkError::io(artifact, e))
}

/// Writes a composite barrel at `artifact` importing each member entry point
/// in order and exporting the list.
///
/// # Errors
///
/// Returns [`LinkError::Io`] when directories cannot be created or the file
/// cannot be written.
pub fn write_composite(artifact: &Path, entry_points: &[PathBuf]) -> Result<(), LinkError> {
    let parent = ensure_parent(artifact)?;
    let mut content = String::new();
    for (i, entry) in entry_points.iter().enumerate() {
        let import = import_path(&relative_path(&parent, entry));
        content.push_str(&format!("import M{i} from \"{import}\";\n"));
    }
    let list: Vec<String> = (0..entry_points.len()).map(|i| format!("M{i}")).collect();
    content.push_str(&format!("\nexport default [{}];\n", list.join(", ")));
    fs::write(artifact, content).map_err(|e| LinkError::io(artifact, e))
}

/// Serializes the manifest as YAML at `path`.
///
/// # Errors
///
/// Returns [`LinkError::Io`] on write failure.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), LinkError> {
    ensure_parent(path)?;
    let yaml = serde_yaml::to_string(manifest)
        .map_err(|e| LinkError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    fs::write(path, yaml).map_err(|e| LinkError::io(path, e))
}

/// Creates the artifact's parent directory and returns it.
fn ensure_parent(artifact: &Path) -> Result<PathBuf, LinkError> {
    let parent = artifact.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    fs::create_dir_all(&parent).map_err(|e| LinkError::io(&parent, e))?;
    Ok(parent)
}

/// Computes the relative path from `from_dir` to `to`. Both paths must be
/// rooted the same way (both absolute or both relative to the same base),
/// which holds for all paths derived from one project root.
fn relative_path(from_dir: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

/// Renders a relative path as an import specifier: forward slashes, with an
/// explicit `./` prefix when it does not already climb out.
fn import_path(rel: &Path) -> String {
    let joined: Vec<String> =
        rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
    let joined = joined.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
