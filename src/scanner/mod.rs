//! Convention-driven directory scanning.
//!
//! The scanner walks one category directory in lexicographic order, applies
//! the auto-rename and disabled-entry rules, resolves each child through the
//! marker layer, and hands a [`Descriptor`] to a caller-supplied callback.
//! It carries no category semantics: whether an item becomes a registered
//! define, a replace rule, or a composite is entirely the callback's call.

pub mod markers;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::priority::PriorityLevel;
use crate::uid::{self, NameConstraint};

/// A directory entry as seen by the scanner.
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Entry file name.
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Whether the entry is a regular file.
    pub is_file: bool,
    /// Whether the entry is a symbolic link.
    pub is_symlink: bool,
}

/// Whether a required marker may be created when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPolicy {
    /// The marker must be present.
    Required {
        /// When `true`, a missing marker is created with a fresh UID instead
        /// of failing.
        create_missing: bool,
    },
    /// The marker must be absent.
    Forbidden,
    /// Presence is not checked.
    Optional,
}

/// What kind of filesystem entry a category's items are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// Items are regular files; dispatched as minimal descriptors.
    Files,
    /// Items are directories; fully resolved through the marker layer.
    Dirs,
}

/// Per-category scanning options.
#[derive(Debug)]
pub struct ScanOptions {
    /// Item type label forwarded into every descriptor.
    pub item_type: String,
    /// Expected entry kind.
    pub kind: ItemKind,
    /// Constraint on entry names.
    pub name_constraint: NameConstraint,
    /// Policy for the `.myuid` marker.
    pub uid: MarkerPolicy,
    /// Policy for the `.ref` marker.
    pub ref_marker: MarkerPolicy,
    /// Named-file slots to resolve per item directory.
    pub resolve_files: Vec<(&'static str, Vec<&'static str>)>,
}

/// The scanner's per-entry output, consumed immediately by the dispatching
/// category and discarded.
#[derive(Debug)]
pub struct Descriptor {
    /// Entry name (post auto-rename).
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// Item type label from the scan options.
    pub item_type: String,
    /// UID from the `.myuid` marker, or the entry name when it parses as one.
    pub uid: Option<String>,
    /// Aliases from `.alias` markers.
    pub aliases: Vec<String>,
    /// Redirect target from the `.ref` marker.
    pub ref_target: Option<String>,
    /// Priority from the `priority*` marker, default otherwise.
    pub priority: PriorityLevel,
    /// Resolved named files, keyed by slot name.
    pub resolved: HashMap<String, PathBuf>,
}

/// Lists `dir`'s entries sorted by name. Entries with non-UTF-8 names are
/// skipped.
///
/// # Errors
///
/// Returns [`LinkError::Io`] when the directory cannot be read.
pub fn list_entries(dir: &Path) -> Result<Vec<EntryInfo>, LinkError> {
    let mut entries = Vec::new();
    let read = fs::read_dir(dir).map_err(|e| LinkError::io(dir, e))?;
    for entry in read {
        let entry = entry.map_err(|e| LinkError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| LinkError::io(entry.path(), e))?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        entries.push(EntryInfo {
            name,
            path: entry.path(),
            is_dir: file_type.is_dir(),
            is_file: file_type.is_file(),
            is_symlink: file_type.is_symlink(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Returns `true` for entries the scan must skip: names starting with `_`
/// or `.` (checked after auto-rename, so a literal `_` never reaches here).
#[must_use]
pub fn is_disabled(name: &str) -> bool {
    name.starts_with('_') || name.starts_with('.')
}

/// Applies the auto-identifier rename: an entry named `_` becomes a fresh
/// UID, and `_.myuid` / `_.ref` markers become `<uid>.myuid` / `<uid>.ref`.
/// Idempotent — a rewritten name no longer matches `_`.
///
/// # Errors
///
/// Returns [`LinkError::Io`] when the rename fails.
pub fn auto_rename(dir: &Path, entry: EntryInfo) -> Result<EntryInfo, LinkError> {
    let new_name = match entry.name.as_str() {
        "_" => uid::generate(),
        "_.myuid" => format!("{}.myuid", uid::generate()),
        "_.ref" => format!("{}.ref", uid::generate()),
        _ => return Ok(entry),
    };
    let new_path = dir.join(&new_name);
    fs::rename(&entry.path, &new_path).map_err(|e| LinkError::io(&entry.path, e))?;
    Ok(EntryInfo { name: new_name, path: new_path, ..entry })
}

/// Scans `dir` and dispatches one [`Descriptor`] per accepted entry to
/// `on_item`. A missing `dir` scans as empty. Entries are visited in
/// lexicographic order; symlinks and disabled entries are skipped, and
/// skipped directories are never descended into.
///
/// # Errors
///
/// Propagates marker-extraction and policy violations, plus any error the
/// callback returns. The first error aborts the scan.
pub fn scan_dir(
    dir: &Path,
    opts: &ScanOptions,
    on_item: &mut dyn FnMut(Descriptor) -> Result<(), LinkError>,
) -> Result<(), LinkError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in list_entries(dir)? {
        let entry = auto_rename(dir, entry)?;
        if entry.is_symlink || is_disabled(&entry.name) {
            continue;
        }

        match opts.kind {
            ItemKind::Files => {
                if !entry.is_file {
                    continue;
                }
                uid::check_name(&entry.name, opts.name_constraint, &entry.path)?;
                let item_uid = uid::is_uid(&entry.name).then(|| entry.name.clone());
                on_item(Descriptor {
                    name: entry.name,
                    path: entry.path,
                    item_type: opts.item_type.clone(),
                    uid: item_uid,
                    aliases: Vec::new(),
                    ref_target: None,
                    priority: PriorityLevel::Default,
                    resolved: HashMap::new(),
                })?;
            }
            ItemKind::Dirs => {
                if !entry.is_dir {
                    continue;
                }
                uid::check_name(&entry.name, opts.name_constraint, &entry.path)?;
                let markers = markers::resolve_markers(&entry.path, &opts.resolve_files)?;
                let item_uid = apply_uid_policy(markers.uid, opts.uid, &entry.path)?;
                apply_ref_policy(markers.ref_target.as_deref(), opts.ref_marker, &entry.path)?;
                on_item(Descriptor {
                    name: entry.name,
                    path: entry.path,
                    item_type: opts.item_type.clone(),
                    uid: item_uid,
                    aliases: markers.aliases,
                    ref_target: markers.ref_target,
                    priority: markers.priority,
                    resolved: markers.resolved,
                })?;
            }
        }
    }

    Ok(())
}

/// Enforces the `.myuid` policy, creating the marker when allowed.
fn apply_uid_policy(
    found: Option<String>,
    policy: MarkerPolicy,
    item_dir: &Path,
) -> Result<Option<String>, LinkError> {
    match policy {
        MarkerPolicy::Required { create_missing } => match found {
            Some(u) => Ok(Some(u)),
            None if create_missing => {
                let fresh = uid::generate();
                let marker = item_dir.join(format!("{fresh}.myuid"));
                fs::write(&marker, &fresh).map_err(|e| LinkError::io(&marker, e))?;
                Ok(Some(fresh))
            }
            None => Err(LinkError::MissingMarker { marker: ".myuid", path: item_dir.to_path_buf() }),
        },
        MarkerPolicy::Forbidden => match found {
            Some(_) => {
                Err(LinkError::UnexpectedMarker { marker: ".myuid", path: item_dir.to_path_buf() })
            }
            None => Ok(None),
        },
        MarkerPolicy::Optional => Ok(found),
    }
}

/// Enforces the `.ref` policy.
fn apply_ref_policy(
    found: Option<&str>,
    policy: MarkerPolicy,
    item_dir: &Path,
) -> Result<(), LinkError> {
    match policy {
        MarkerPolicy::Required { .. } if found.is_none() => {
            Err(LinkError::MissingMarker { marker: ".ref", path: item_dir.to_path_buf() })
        }
        MarkerPolicy::Forbidden if found.is_some() => {
            Err(LinkError::UnexpectedMarker { marker: ".ref", path: item_dir.to_path_buf() })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("arolink_scan_{tag}_{}", uid::generate()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn dir_opts() -> ScanOptions {
        ScanOptions {
            item_type: "widget".to_string(),
            kind: ItemKind::Dirs,
            name_constraint: NameConstraint::MustNotBeUid,
            uid: MarkerPolicy::Optional,
            ref_marker: MarkerPolicy::Optional,
            resolve_files: vec![],
        }
    }

    fn collect_names(dir: &Path, opts: &ScanOptions) -> Vec<String> {
        let mut names = Vec::new();
        scan_dir(dir, opts, &mut |d| {
            names.push(d.name);
            Ok(())
        })
        .unwrap();
        names
    }

    #[test]
    fn visits_directories_in_lexicographic_order() {
        let dir = temp_dir("order");
        for name in ["zeta", "alpha", "mid"] {
            fs::create_dir(dir.join(name)).unwrap();
        }
        assert_eq!(collect_names(&dir, &dir_opts()), vec!["alpha", "mid", "zeta"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_scans_as_empty() {
        let dir = std::env::temp_dir().join(format!("arolink_scan_gone_{}", uid::generate()));
        assert!(collect_names(&dir, &dir_opts()).is_empty());
    }

    #[test]
    fn skips_disabled_entries() {
        let dir = temp_dir("disabled");
        fs::create_dir(dir.join("_off")).unwrap();
        fs::create_dir(dir.join(".hidden")).unwrap();
        fs::create_dir(dir.join("on")).unwrap();
        assert_eq!(collect_names(&dir, &dir_opts()), vec!["on"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn skips_symlinks() {
        let dir = temp_dir("symlink");
        fs::create_dir(dir.join("real")).unwrap();
        std::os::unix::fs::symlink(dir.join("real"), dir.join("linked")).unwrap();
        assert_eq!(collect_names(&dir, &dir_opts()), vec!["real"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn underscore_entry_is_renamed_to_a_uid_once() {
        let dir = temp_dir("underscore");
        fs::create_dir(dir.join("_")).unwrap();

        let opts = ScanOptions { name_constraint: NameConstraint::CanBeUid, ..dir_opts() };
        let first = collect_names(&dir, &opts);
        assert_eq!(first.len(), 1);
        assert!(uid::is_uid(&first[0]));
        assert!(!dir.join("_").exists());

        // Idempotent: a second scan sees the same name and renames nothing.
        assert_eq!(collect_names(&dir, &opts), first);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn name_constraint_is_enforced() {
        let dir = temp_dir("constraint");
        fs::create_dir(dir.join("plainName")).unwrap();

        let opts = ScanOptions { name_constraint: NameConstraint::MustBeUid, ..dir_opts() };
        let err = scan_dir(&dir, &opts, &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, LinkError::NamingConstraintViolation { .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn required_uid_marker_missing_fails() {
        let dir = temp_dir("uid_required");
        fs::create_dir(dir.join("item")).unwrap();

        let opts =
            ScanOptions { uid: MarkerPolicy::Required { create_missing: false }, ..dir_opts() };
        let err = scan_dir(&dir, &opts, &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, LinkError::MissingMarker { marker: ".myuid", .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn required_uid_marker_can_be_auto_created() {
        let dir = temp_dir("uid_create");
        let item = dir.join("item");
        fs::create_dir(&item).unwrap();

        let opts =
            ScanOptions { uid: MarkerPolicy::Required { create_missing: true }, ..dir_opts() };
        let mut seen = None;
        scan_dir(&dir, &opts, &mut |d| {
            seen = d.uid.clone();
            Ok(())
        })
        .unwrap();

        let assigned = seen.unwrap();
        assert!(uid::is_uid(&assigned));
        let marker = item.join(format!("{assigned}.myuid"));
        assert_eq!(fs::read_to_string(marker).unwrap(), assigned);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn forbidden_ref_marker_fails() {
        let dir = temp_dir("ref_forbidden");
        let item = dir.join("item");
        fs::create_dir(&item).unwrap();
        fs::write(item.join("somewhere.ref"), "").unwrap();

        let opts = ScanOptions { ref_marker: MarkerPolicy::Forbidden, ..dir_opts() };
        let err = scan_dir(&dir, &opts, &mut |_| Ok(())).unwrap_err();
        assert!(matches!(err, LinkError::UnexpectedMarker { marker: ".ref", .. }));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_mode_dispatches_minimal_descriptors() {
        let dir = temp_dir("files");
        let u = uid::generate();
        fs::write(dir.join(&u), "").unwrap();
        fs::write(dir.join("notes"), "").unwrap();
        fs::create_dir(dir.join("subdir")).unwrap();

        let opts = ScanOptions {
            kind: ItemKind::Files,
            name_constraint: NameConstraint::CanBeUid,
            ..dir_opts()
        };
        let mut seen = Vec::new();
        scan_dir(&dir, &opts, &mut |d| {
            seen.push((d.name, d.uid));
            Ok(())
        })
        .unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (u.clone(), Some(u)));
        assert_eq!(seen[1], ("notes".to_string(), None));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn callback_error_aborts_the_scan() {
        let dir = temp_dir("abort");
        fs::create_dir(dir.join("a")).unwrap();
        fs::create_dir(dir.join("b")).unwrap();

        let mut visited = 0;
        let err = scan_dir(&dir, &dir_opts(), &mut |d| {
            visited += 1;
            Err(LinkError::ConflictingReference { path: d.path })
        })
        .unwrap_err();

        assert!(matches!(err, LinkError::ConflictingReference { .. }));
        assert_eq!(visited, 1);
        let _ = fs::remove_dir_all(&dir);
    }
}
