//! Identifier registry: multi-key item storage with global uniqueness.
//!
//! Every item is reachable from its UID and each of its aliases; all keys
//! share ownership of a single allocation. The registry is populated during
//! scanning, rebound at most once per key during override resolution, and
//! read-only during emission.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KeyKind, LinkError};
use crate::priority::PriorityLevel;

/// Optional metadata from a define's `info.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefineInfo {
    /// Human-readable display name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A composite member after reference resolution, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMember {
    /// Effective entry point (own or taken from the referenced define).
    pub entry_point: PathBuf,
    /// Priority bucket the member was emitted from.
    pub priority: PriorityLevel,
}

/// Category-specific payload of a registry item.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A declared implementation unit with a resolved entry point.
    Define {
        /// Entry-point file of the unit.
        entry_point: PathBuf,
        /// Parsed `info.json`, when present.
        info: Option<DefineInfo>,
    },
    /// An ordered group of member references.
    Composite {
        /// Members in emission order (priority buckets, high to low).
        members: Vec<ResolvedMember>,
    },
}

/// A resolved item, shared by all of its keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryItem {
    /// Primary key.
    pub uid: String,
    /// Secondary keys.
    pub aliases: Vec<String>,
    /// Declaring directory.
    pub path: PathBuf,
    /// Item type label (the `@defines/<itemType>` directory name).
    pub item_type: String,
    /// Owning category kind name, used to dispatch finalize hooks.
    pub category: String,
    /// Category-specific payload.
    pub payload: Payload,
}

/// Key-to-item store enforcing global key uniqueness.
#[derive(Debug, Default)]
pub struct Registry {
    items: HashMap<String, Arc<RegistryItem>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `item` under its UID and every alias.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::DuplicateIdentifier`] if any key is already
    /// bound; nothing is inserted in that case.
    pub fn add_item(&mut self, item: RegistryItem) -> Result<(), LinkError> {
        let keys: Vec<String> =
            std::iter::once(item.uid.clone()).chain(item.aliases.iter().cloned()).collect();
        for key in &keys {
            if self.items.contains_key(key) {
                return Err(LinkError::DuplicateIdentifier { key: key.clone(), path: item.path });
            }
        }
        let shared = Arc::new(item);
        for key in keys {
            self.items.insert(key, Arc::clone(&shared));
        }
        Ok(())
    }

    /// Looks up the item bound to `key`.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&Arc<RegistryItem>> {
        self.items.get(key)
    }

    /// Looks up `key`, failing when it is unbound.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::UnresolvedReference`] carrying `at` (the
    /// referencing declaration) and whether the key looks like a UID or an
    /// alias.
    pub fn require(&self, key: &str, at: &Path) -> Result<&Arc<RegistryItem>, LinkError> {
        self.items.get(key).ok_or_else(|| LinkError::UnresolvedReference {
            key: key.to_string(),
            kind: KeyKind::of(key),
            path: at.to_path_buf(),
        })
    }

    /// Overwrites the binding for `key` to point at `item`. Used exactly
    /// once per replace rule during resolution; other keys of the previously
    /// bound item are untouched.
    pub fn rebind(&mut self, key: &str, item: Arc<RegistryItem>) {
        self.items.insert(key.to_string(), item);
    }

    /// Number of bound keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.items.len()
    }

    /// Number of distinct items (an item with aliases counts once).
    #[must_use]
    pub fn item_count(&self) -> usize {
        let mut uids: Vec<&str> = self.items.values().map(|i| i.uid.as_str()).collect();
        uids.sort_unstable();
        uids.dedup();
        uids.len()
    }

    /// All bindings sorted by key, for deterministic emission.
    #[must_use]
    pub fn iter_sorted(&self) -> Vec<(&str, &Arc<RegistryItem>)> {
        let mut bindings: Vec<(&str, &Arc<RegistryItem>)> =
            self.items.iter().map(|(k, v)| (k.as_str(), v)).collect();
        bindings.sort_by_key(|(k, _)| *k);
        bindings
    }
}
