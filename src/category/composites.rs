//! The `@composites` category: ordered groups of member references.
//!
//! Layout: `@composites/<itemType>/<name>/` where `<name>` carries the
//! group's `.myuid` (auto-created when missing) and one subdirectory per
//! member. A member either holds its own entry point or a `<key>.ref`
//! marker pointing at a registered define — never both — plus an optional
//! `priority*` marker that decides its emission bucket.

use std::path::Path;

use crate::category::{for_each_item_type, Category};
use crate::composite::{CompositeDecl, CompositeMember};
use crate::context::LinkContext;
use crate::emit::{self, EmitContext};
use crate::error::LinkError;
use crate::registry::{Payload, RegistryItem};
use crate::scanner::{self, ItemKind, MarkerPolicy, ScanOptions};
use crate::uid::NameConstraint;

/// The standard composites kind.
pub struct Composites;

impl Category for Composites {
    fn name(&self) -> &str {
        "composites"
    }

    fn scan(&self, ctx: &mut LinkContext, category_root: &Path) -> Result<(), LinkError> {
        for_each_item_type(category_root, |item_type, dir| {
            let opts = ScanOptions {
                item_type: item_type.to_string(),
                kind: ItemKind::Dirs,
                name_constraint: NameConstraint::MustNotBeUid,
                uid: MarkerPolicy::Required { create_missing: true },
                ref_marker: MarkerPolicy::Forbidden,
                resolve_files: vec![],
            };
            scanner::scan_dir(dir, &opts, &mut |d| {
                let members = scan_members(&d.path, item_type)?;
                let Some(uid) = d.uid else {
                    return Err(LinkError::MissingMarker { marker: ".myuid", path: d.path });
                };
                ctx.composites.add(CompositeDecl {
                    uid,
                    aliases: d.aliases,
                    item_type: d.item_type,
                    members,
                    path: d.path,
                })
            })
        })
    }

    fn finalize(
        &self,
        key: &str,
        item: &RegistryItem,
        out: &EmitContext,
    ) -> Result<(), LinkError> {
        let Payload::Composite { members } = &item.payload else {
            return Ok(());
        };
        let entries: Vec<_> = members.iter().map(|m| m.entry_point.clone()).collect();
        let artifact = out.output_root.join("composites").join(format!("{key}.ts"));
        emit::write_composite(&artifact, &entries)?;
        println!("Linked [{}] {key} ({} members)", item.item_type, members.len());
        Ok(())
    }
}

/// Scans a composite directory's member subdirectories in encounter order.
fn scan_members(composite_dir: &Path, item_type: &str) -> Result<Vec<CompositeMember>, LinkError> {
    let opts = ScanOptions {
        item_type: item_type.to_string(),
        kind: ItemKind::Dirs,
        name_constraint: NameConstraint::MustNotBeUid,
        uid: MarkerPolicy::Optional,
        ref_marker: MarkerPolicy::Optional,
        resolve_files: vec![("entryPoint", vec!["index.tsx", "index.ts"])],
    };
    let mut members = Vec::new();
    scanner::scan_dir(composite_dir, &opts, &mut |child| {
        let entry_point = child.resolved.get("entryPoint").cloned();
        if entry_point.is_some() && child.ref_target.is_some() {
            return Err(LinkError::ConflictingReference { path: child.path });
        }
        if entry_point.is_none() && child.ref_target.is_none() {
            return Err(LinkError::MissingMarker {
                marker: "entry point or .ref",
                path: child.path,
            });
        }
        members.push(CompositeMember {
            entry_point,
            ref_target: child.ref_target,
            priority: child.priority,
            sort_key: child.name,
            path: child.path,
        });
        Ok(())
    })?;
    Ok(members)
}
