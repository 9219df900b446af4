//! Composite assembly: grouping, merging, and ordering member references.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::LinkError;
use crate::priority::PriorityLevel;
use crate::registry::{Payload, Registry, RegistryItem, ResolvedMember};

/// One scanned composite member: a direct entry point or a reference to a
/// registry key, never both.
#[derive(Debug, Clone)]
pub struct CompositeMember {
    /// Direct entry-point file, when the member carries its own code.
    pub entry_point: Option<PathBuf>,
    /// Registry key of the referenced define, when declared by `.ref`.
    pub ref_target: Option<String>,
    /// Ordering bucket.
    pub priority: PriorityLevel,
    /// Member directory name. Recorded but not consulted for ordering;
    /// only the priority bucket and encounter order matter.
    pub sort_key: String,
    /// Declaring member directory.
    pub path: PathBuf,
}

/// One composite declaration (one directory). Declarations sharing a UID
/// are merged by [`CompositeSet::add`].
#[derive(Debug, Clone)]
pub struct CompositeDecl {
    /// Group identifier.
    pub uid: String,
    /// Secondary keys of the group.
    pub aliases: Vec<String>,
    /// Declared item type; must agree across merged declarations.
    pub item_type: String,
    /// Members in encounter order.
    pub members: Vec<CompositeMember>,
    /// Declaring directory (the first one, for merged composites).
    pub path: PathBuf,
}

/// Accumulates composite declarations during scanning and resolves them into
/// registry items afterwards.
#[derive(Debug, Default)]
pub struct CompositeSet {
    order: Vec<String>,
    decls: HashMap<String, CompositeDecl>,
}

impl CompositeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, merging it into an existing one with the same UID
    /// by concatenating member lists and unioning aliases.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::TypeConflict`] when a merged declaration's
    /// item type differs from the stored one.
    pub fn add(&mut self, decl: CompositeDecl) -> Result<(), LinkError> {
        match self.decls.entry(decl.uid.clone()) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                let existing = e.get_mut();
                if existing.item_type != decl.item_type {
                    return Err(LinkError::TypeConflict {
                        key: decl.uid,
                        expected: existing.item_type.clone(),
                        found: decl.item_type,
                        path: decl.path,
                    });
                }
                existing.members.extend(decl.members);
                for alias in decl.aliases {
                    if !existing.aliases.contains(&alias) {
                        existing.aliases.push(alias);
                    }
                }
            }
            std::collections::hash_map::Entry::Vacant(v) => {
                self.order.push(decl.uid.clone());
                v.insert(decl);
            }
        }
        Ok(())
    }

    /// Number of distinct composites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether no composites were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Resolves every composite and registers it. Runs after override
    /// resolution so `.ref` members see post-replacement bindings.
    ///
    /// Members are ordered into the five fixed priority buckets and
    /// concatenated from `VeryHigh` down to `VeryLow`; within a bucket the
    /// scan encounter order is kept.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::UnresolvedReference`] for a dangling `.ref`,
    /// [`LinkError::TypeConflict`] when a `.ref` resolves to anything but a
    /// define, [`LinkError::MissingMarker`] for a member carrying neither an
    /// entry point nor a ref, and [`LinkError::ConflictingReference`] for one
    /// carrying both. Any member failure fails the whole composite.
    pub fn resolve(&self, registry: &mut Registry) -> Result<(), LinkError> {
        for uid in &self.order {
            let decl = &self.decls[uid];
            let mut members = Vec::with_capacity(decl.members.len());
            for level in PriorityLevel::DESCENDING {
                for member in decl.members.iter().filter(|m| m.priority == level) {
                    members.push(ResolvedMember {
                        entry_point: effective_entry_point(member, registry)?,
                        priority: level,
                    });
                }
            }
            registry.add_item(RegistryItem {
                uid: decl.uid.clone(),
                aliases: decl.aliases.clone(),
                path: decl.path.clone(),
                item_type: decl.item_type.clone(),
                category: "composites".to_string(),
                payload: Payload::Composite { members },
            })?;
        }
        Ok(())
    }
}

/// A member's effective entry point: its own, or the referenced define's.
fn effective_entry_point(
    member: &CompositeMember,
    registry: &Registry,
) -> Result<PathBuf, LinkError> {
    match (&member.entry_point, &member.ref_target) {
        (Some(entry), None) => Ok(entry.clone()),
        (None, Some(key)) => {
            let target = registry.require(key, &member.path)?;
            match &target.payload {
                Payload::Define { entry_point, .. } => Ok(entry_point.clone()),
                Payload::Composite { .. } => Err(LinkError::TypeConflict {
                    key: key.clone(),
                    expected: "defines".to_string(),
                    found: target.category.clone(),
                    path: member.path.clone(),
                }),
            }
        }
        (Some(_), Some(_)) => Err(LinkError::ConflictingReference { path: member.path.clone() }),
        (None, None) => Err(LinkError::MissingMarker {
            marker: "entry point or .ref",
            path: member.path.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uid;
    use std::path::Path;

    fn direct(entry: &str, priority: PriorityLevel) -> CompositeMember {
        CompositeMember {
            entry_point: Some(PathBuf::from(entry)),
            ref_target: None,
            priority,
            sort_key: Path::new(entry).parent().unwrap().to_string_lossy().into_owned(),
            path: PathBuf::from(entry).parent().unwrap().to_path_buf(),
        }
    }

    fn by_ref(key: &str, priority: PriorityLevel) -> CompositeMember {
        CompositeMember {
            entry_point: None,
            ref_target: Some(key.to_string()),
            priority,
            sort_key: "ref".to_string(),
            path: PathBuf::from("/m/@composites/menu/c/ref"),
        }
    }

    fn decl(uid: &str, item_type: &str, members: Vec<CompositeMember>) -> CompositeDecl {
        CompositeDecl {
            uid: uid.to_string(),
            aliases: vec![],
            item_type: item_type.to_string(),
            members,
            path: PathBuf::from("/m/@composites").join(item_type).join(uid),
        }
    }

    fn add_define(registry: &mut Registry, uid: &str, entry: &str) {
        registry
            .add_item(RegistryItem {
                uid: uid.to_string(),
                aliases: vec![],
                path: PathBuf::from(entry).parent().unwrap().to_path_buf(),
                item_type: "widget".to_string(),
                category: "defines".to_string(),
                payload: Payload::Define { entry_point: PathBuf::from(entry), info: None },
            })
            .unwrap();
    }

    fn resolved_members(registry: &Registry, uid: &str) -> Vec<ResolvedMember> {
        match &registry.lookup(uid).unwrap().payload {
            Payload::Composite { members } => members.clone(),
            Payload::Define { .. } => panic!("expected composite"),
        }
    }

    #[test]
    fn members_emit_in_priority_buckets_with_stable_order() {
        let u = uid::generate();
        let mut set = CompositeSet::new();
        set.add(decl(
            &u,
            "menu",
            vec![
                direct("/a/index.ts", PriorityLevel::Low),
                direct("/b/index.ts", PriorityLevel::VeryHigh),
                direct("/c/index.ts", PriorityLevel::Default),
                direct("/d/index.ts", PriorityLevel::VeryHigh),
            ],
        ))
        .unwrap();

        let mut registry = Registry::new();
        set.resolve(&mut registry).unwrap();

        let entries: Vec<PathBuf> =
            resolved_members(&registry, &u).into_iter().map(|m| m.entry_point).collect();
        assert_eq!(
            entries,
            vec![
                PathBuf::from("/b/index.ts"),
                PathBuf::from("/d/index.ts"),
                PathBuf::from("/c/index.ts"),
                PathBuf::from("/a/index.ts"),
            ]
        );
    }

    #[test]
    fn same_uid_declarations_merge_member_lists() {
        let u = uid::generate();
        let mut set = CompositeSet::new();
        set.add(decl(&u, "menu", vec![direct("/a/index.ts", PriorityLevel::Default)])).unwrap();
        set.add(decl(&u, "menu", vec![direct("/b/index.ts", PriorityLevel::Default)])).unwrap();
        assert_eq!(set.len(), 1);

        let mut registry = Registry::new();
        set.resolve(&mut registry).unwrap();
        let entries: Vec<PathBuf> =
            resolved_members(&registry, &u).into_iter().map(|m| m.entry_point).collect();
        assert_eq!(entries, vec![PathBuf::from("/a/index.ts"), PathBuf::from("/b/index.ts")]);
    }

    #[test]
    fn item_type_mismatch_is_a_type_conflict() {
        let u = uid::generate();
        let mut set = CompositeSet::new();
        set.add(decl(&u, "menu", vec![])).unwrap();
        let err = set.add(decl(&u, "toolbar", vec![])).unwrap_err();
        match err {
            LinkError::TypeConflict { expected, found, .. } => {
                assert_eq!(expected, "menu");
                assert_eq!(found, "toolbar");
            }
            other => panic!("expected TypeConflict, got {other}"),
        }
    }

    #[test]
    fn ref_members_take_the_defines_entry_point() {
        let u = uid::generate();
        let d = uid::generate();
        let mut registry = Registry::new();
        add_define(&mut registry, &d, "/m/button/index.ts");

        let mut set = CompositeSet::new();
        set.add(decl(&u, "menu", vec![by_ref(&d, PriorityLevel::Default)])).unwrap();
        set.resolve(&mut registry).unwrap();

        let entries = resolved_members(&registry, &u);
        assert_eq!(entries[0].entry_point, PathBuf::from("/m/button/index.ts"));
    }

    #[test]
    fn dangling_ref_fails_the_whole_composite() {
        let u = uid::generate();
        let mut set = CompositeSet::new();
        set.add(decl(
            &u,
            "menu",
            vec![
                direct("/a/index.ts", PriorityLevel::Default),
                by_ref("neverDefined", PriorityLevel::Default),
            ],
        ))
        .unwrap();

        let mut registry = Registry::new();
        let err = set.resolve(&mut registry).unwrap_err();
        assert!(matches!(err, LinkError::UnresolvedReference { .. }));
        assert!(registry.lookup(&u).is_none());
    }

    #[test]
    fn ref_to_a_composite_is_a_type_conflict() {
        let inner = uid::generate();
        let outer = uid::generate();
        let mut registry = Registry::new();

        let mut set = CompositeSet::new();
        set.add(decl(&inner, "menu", vec![direct("/a/index.ts", PriorityLevel::Default)])).unwrap();
        set.resolve(&mut registry).unwrap();

        let mut set = CompositeSet::new();
        set.add(decl(&outer, "menu", vec![by_ref(&inner, PriorityLevel::Default)])).unwrap();
        let err = set.resolve(&mut registry).unwrap_err();
        assert!(matches!(err, LinkError::TypeConflict { .. }));
    }

    #[test]
    fn member_with_both_entry_and_ref_conflicts() {
        let u = uid::generate();
        let mut member = direct("/a/index.ts", PriorityLevel::Default);
        member.ref_target = Some("something".to_string());

        let mut set = CompositeSet::new();
        set.add(decl(&u, "menu", vec![member])).unwrap();
        let mut registry = Registry::new();
        let err = set.resolve(&mut registry).unwrap_err();
        assert!(matches!(err, LinkError::ConflictingReference { .. }));
    }

    #[test]
    fn member_with_neither_entry_nor_ref_fails() {
        let u = uid::generate();
        let member = CompositeMember {
            entry_point: None,
            ref_target: None,
            priority: PriorityLevel::Default,
            sort_key: "empty".to_string(),
            path: PathBuf::from("/m/empty"),
        };
        let mut set = CompositeSet::new();
        set.add(decl(&u, "menu", vec![member])).unwrap();
        let mut registry = Registry::new();
        let err = set.resolve(&mut registry).unwrap_err();
        assert!(matches!(err, LinkError::MissingMarker { .. }));
    }
}
