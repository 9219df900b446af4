//! Per-directory marker extraction.
//!
//! A directory's identity and metadata are encoded in the names of marker
//! files it contains: `<uid>.myuid`, `<alias>.alias`, `<key>.ref`, and a
//! `priority*` file. Extraction runs once per visited directory and also
//! performs the two filesystem side effects of a scan: auto-renaming `_`
//! placeholders to fresh UUIDs and stamping each consumed marker file with
//! its own identifying value (so identifiers are findable by full-text
//! search over the tree).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::priority::PriorityLevel;
use crate::scanner::{auto_rename, is_disabled, list_entries};

/// Markers extracted from one directory.
#[derive(Debug, Default)]
pub struct DirMarkers {
    /// UID from the single `.myuid` file, if present.
    pub uid: Option<String>,
    /// Aliases from `.alias` files, in lexicographic file order.
    pub aliases: Vec<String>,
    /// Redirect target from the single `.ref` file, if present.
    pub ref_target: Option<String>,
    /// Priority from the single `priority*` file, defaulting otherwise.
    pub priority: PriorityLevel,
    /// Named files resolved from the caller's candidate lists.
    pub resolved: HashMap<String, PathBuf>,
}

/// Extracts markers from `dir`.
///
/// `resolve_files` maps slot names to ordered candidate filenames; each slot
/// resolves to the first candidate existing as a regular file.
///
/// # Errors
///
/// Fails with [`LinkError::DuplicateMarker`] when more than one `.myuid`,
/// `.ref`, or priority file is declared, and with [`LinkError::Io`] on
/// filesystem failures (including the rename and stamping side effects).
pub fn resolve_markers(
    dir: &Path,
    resolve_files: &[(&'static str, Vec<&'static str>)],
) -> Result<DirMarkers, LinkError> {
    let mut markers = DirMarkers::default();
    let mut priority_seen = false;

    for entry in list_entries(dir)? {
        let entry = auto_rename(dir, entry)?;
        if entry.is_symlink || is_disabled(&entry.name) || !entry.is_file {
            continue;
        }

        if let Some(stem) = entry.name.strip_suffix(".myuid") {
            if markers.uid.is_some() {
                return Err(LinkError::DuplicateMarker { marker: ".myuid", path: dir.to_path_buf() });
            }
            markers.uid = Some(stem.to_string());
            stamp(&entry.path, stem)?;
        } else if let Some(stem) = entry.name.strip_suffix(".alias") {
            markers.aliases.push(stem.to_string());
            stamp(&entry.path, stem)?;
        } else if let Some(stem) = entry.name.strip_suffix(".ref") {
            if markers.ref_target.is_some() {
                return Err(LinkError::DuplicateMarker { marker: ".ref", path: dir.to_path_buf() });
            }
            markers.ref_target = Some(stem.to_string());
            stamp(&entry.path, stem)?;
        } else if let Some(level) = PriorityLevel::from_marker_name(&entry.name) {
            if priority_seen {
                return Err(LinkError::DuplicateMarker {
                    marker: "priority",
                    path: dir.to_path_buf(),
                });
            }
            priority_seen = true;
            markers.priority = level;
            stamp(&entry.path, &entry.name)?;
        }
    }

    for (slot, candidates) in resolve_files {
        for candidate in candidates {
            let path = dir.join(candidate);
            if is_regular_file(&path) {
                markers.resolved.insert((*slot).to_string(), path);
                break;
            }
        }
    }

    Ok(markers)
}

/// Writes `value` into the marker file unless it already holds it, keeping
/// re-runs free of spurious writes.
fn stamp(path: &Path, value: &str) -> Result<(), LinkError> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == value {
            return Ok(());
        }
    }
    fs::write(path, value).map_err(|e| LinkError::io(path, e))
}

/// Regular-file check that does not follow symlinks.
fn is_regular_file(path: &Path) -> bool {
    fs::symlink_metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
