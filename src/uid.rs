//! Canonical UUIDv4 identifiers and naming constraints.

use std::path::Path;

use uuid::{Uuid, Version};

use crate::error::LinkError;

/// Constraint on whether a directory entry name may be a UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameConstraint {
    /// The name must parse as a canonical UUIDv4.
    MustBeUid,
    /// The name must not parse as a canonical UUIDv4.
    MustNotBeUid,
    /// Either form is accepted.
    CanBeUid,
}

/// Returns `true` if `s` is a canonical UUIDv4 string: 36 characters,
/// lowercase hyphenated form, version nibble 4.
#[must_use]
pub fn is_uid(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    let Ok(parsed) = Uuid::parse_str(s) else {
        return false;
    };
    // parse_str accepts uppercase; canonical form is lowercase hyphenated.
    parsed.get_version() == Some(Version::Random) && parsed.as_hyphenated().to_string() == s
}

/// Generates a fresh canonical UUIDv4 string.
#[must_use]
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

/// Checks `name` against `constraint`.
///
/// # Errors
///
/// Returns [`LinkError::NamingConstraintViolation`] carrying `dir` when the
/// name's UID-ness does not satisfy the constraint.
pub fn check_name(name: &str, constraint: NameConstraint, dir: &Path) -> Result<(), LinkError> {
    let violated = match constraint {
        NameConstraint::MustBeUid => !is_uid(name),
        NameConstraint::MustNotBeUid => is_uid(name),
        NameConstraint::CanBeUid => false,
    };
    if violated {
        return Err(LinkError::NamingConstraintViolation {
            name: name.to_string(),
            constraint,
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}
