//! Error taxonomy for the linking pipeline.
//!
//! Every failure is fatal: the first error aborts the run before any
//! artifact is written. Each variant carries the filesystem path it was
//! detected at so the offending declaration can be located directly.

use std::path::PathBuf;

use thiserror::Error;

use crate::uid::NameConstraint;

/// Classifies a registry key by shape, used to sharpen unresolved-reference
/// messages: a dangling UID usually means a deleted item, a dangling alias
/// usually means a typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The key parses as a canonical UUIDv4.
    Uid,
    /// Any other string key.
    Alias,
}

impl KeyKind {
    /// Classifies `key` by whether it parses as a canonical UUIDv4.
    #[must_use]
    pub fn of(key: &str) -> Self {
        if crate::uid::is_uid(key) { Self::Uid } else { Self::Alias }
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uid => write!(f, "looks like a UID"),
            Self::Alias => write!(f, "looks like an alias"),
        }
    }
}

/// Fatal linking errors. See the module docs for the fail-fast contract.
#[derive(Debug, Error)]
pub enum LinkError {
    /// An entry name violated the category's naming constraint.
    #[error("name '{name}' violates constraint {constraint:?} at {}", path.display())]
    NamingConstraintViolation {
        /// The offending entry name.
        name: String,
        /// The constraint that was checked.
        constraint: NameConstraint,
        /// Directory the entry lives in.
        path: PathBuf,
    },

    /// More than one marker file of a kind that allows at most one.
    #[error("more than one {marker} marker declared at {}", path.display())]
    DuplicateMarker {
        /// Marker kind (`.myuid`, `.ref`, `priority*`).
        marker: &'static str,
        /// Directory holding the duplicate markers.
        path: PathBuf,
    },

    /// A marker or file the category requires is absent.
    #[error("missing required {marker} at {}", path.display())]
    MissingMarker {
        /// What was expected.
        marker: &'static str,
        /// Directory that was inspected.
        path: PathBuf,
    },

    /// A marker the category forbids is present.
    #[error("unexpected {marker} marker at {}", path.display())]
    UnexpectedMarker {
        /// The forbidden marker kind.
        marker: &'static str,
        /// Directory holding the marker.
        path: PathBuf,
    },

    /// A UID or alias is already bound to a different item.
    #[error("identifier '{key}' is already bound to another item, redeclared at {}", path.display())]
    DuplicateIdentifier {
        /// The colliding key.
        key: String,
        /// Path of the redeclaring item.
        path: PathBuf,
    },

    /// A referenced key does not resolve in the registry.
    #[error("unresolved reference '{key}' ({kind}) at {}", path.display())]
    UnresolvedReference {
        /// The dangling key.
        key: String,
        /// Whether the key looks like a UID or an alias.
        kind: KeyKind,
        /// Path of the referencing declaration.
        path: PathBuf,
    },

    /// A composite member declares both an entry point and a `.ref` file.
    #[error("composite member at {} declares both an entry point and a .ref file", path.display())]
    ConflictingReference {
        /// The member directory.
        path: PathBuf,
    },

    /// Declarations sharing a key disagree on item type.
    #[error("'{key}' declared with item type '{found}' but previously '{expected}', at {}", path.display())]
    TypeConflict {
        /// The shared key.
        key: String,
        /// Item type recorded first.
        expected: String,
        /// Item type of the conflicting declaration.
        found: String,
        /// Path of the conflicting declaration.
        path: PathBuf,
    },

    /// An underlying filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation targeted.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl LinkError {
    /// Wraps an `io::Error` with the path the operation targeted.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
