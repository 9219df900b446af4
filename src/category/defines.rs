//! The `@defines` category: declared implementation units.
//!
//! Layout: `@defines/<itemType>/<name>/` where `<name>` is a human-readable
//! directory (never a UID) carrying a `.myuid` marker, optional `.alias`
//! markers, an entry point (`index.tsx` or `index.ts`), and an optional
//! `info.json`. A missing `.myuid` is auto-created so fresh items get a
//! stable identifier on their first scan.

use std::fs;
use std::path::Path;

use crate::category::{for_each_item_type, Category};
use crate::context::LinkContext;
use crate::emit::{self, EmitContext};
use crate::error::LinkError;
use crate::registry::{DefineInfo, Payload, RegistryItem};
use crate::scanner::{self, ItemKind, MarkerPolicy, ScanOptions};
use crate::uid::NameConstraint;

/// The standard defines kind.
pub struct Defines;

impl Category for Defines {
    fn name(&self) -> &str {
        "defines"
    }

    fn scan(&self, ctx: &mut LinkContext, category_root: &Path) -> Result<(), LinkError> {
        for_each_item_type(category_root, |item_type, dir| {
            let opts = ScanOptions {
                item_type: item_type.to_string(),
                kind: ItemKind::Dirs,
                name_constraint: NameConstraint::MustNotBeUid,
                uid: MarkerPolicy::Required { create_missing: true },
                ref_marker: MarkerPolicy::Forbidden,
                resolve_files: vec![
                    ("entryPoint", vec!["index.tsx", "index.ts"]),
                    ("info", vec!["info.json"]),
                ],
            };
            scanner::scan_dir(dir, &opts, &mut |d| {
                let Some(entry_point) = d.resolved.get("entryPoint").cloned() else {
                    return Err(LinkError::MissingMarker {
                        marker: "entry point (index.tsx or index.ts)",
                        path: d.path,
                    });
                };
                let info = match d.resolved.get("info") {
                    Some(p) => Some(load_info(p)?),
                    None => None,
                };
                let Some(uid) = d.uid else {
                    return Err(LinkError::MissingMarker { marker: ".myuid", path: d.path });
                };
                ctx.registry.add_item(RegistryItem {
                    uid,
                    aliases: d.aliases,
                    path: d.path,
                    item_type: d.item_type,
                    category: "defines".to_string(),
                    payload: Payload::Define { entry_point, info },
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
        let Payload::Define { entry_point, .. } = &item.payload else {
            return Ok(());
        };
        let artifact = out.output_root.join("id").join(format!("{key}.ts"));
        emit::write_redirect(&artifact, entry_point)?;
        println!("Linked [{}] {key}", item.item_type);
        Ok(())
    }
}

/// Parses a define's `info.json`.
fn load_info(path: &Path) -> Result<DefineInfo, LinkError> {
    let content = fs::read_to_string(path).map_err(|e| LinkError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| LinkError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
