//! The `@replaces` category: priority-ranked override declarations.
//!
//! Layout: `@replaces/<itemType>/<key>/` where `<key>` — the identifier to
//! replace — may be a UID or an alias. The directory carries a mandatory
//! `<target>.ref` marker naming the replacement and an optional `priority*`
//! marker. Rules only accumulate during scanning; they rewrite registry
//! bindings in the resolution pass.

use std::path::Path;

use crate::category::{for_each_item_type, Category};
use crate::context::LinkContext;
use crate::emit::EmitContext;
use crate::error::LinkError;
use crate::registry::RegistryItem;
use crate::replace::ReplaceRule;
use crate::scanner::{self, ItemKind, MarkerPolicy, ScanOptions};
use crate::uid::NameConstraint;

/// The standard replaces kind.
pub struct Replaces;

impl Category for Replaces {
    fn name(&self) -> &str {
        "replaces"
    }

    fn scan(&self, ctx: &mut LinkContext, category_root: &Path) -> Result<(), LinkError> {
        for_each_item_type(category_root, |item_type, dir| {
            let opts = ScanOptions {
                item_type: item_type.to_string(),
                kind: ItemKind::Dirs,
                name_constraint: NameConstraint::CanBeUid,
                uid: MarkerPolicy::Optional,
                ref_marker: MarkerPolicy::Required { create_missing: false },
                resolve_files: vec![],
            };
            scanner::scan_dir(dir, &opts, &mut |d| {
                let Some(replace_with) = d.ref_target else {
                    return Err(LinkError::MissingMarker { marker: ".ref", path: d.path });
                };
                ctx.replaces.add(ReplaceRule {
                    must_replace: d.name,
                    replace_with,
                    priority: d.priority,
                    path: d.path,
                });
                Ok(())
            })
        })
    }

    /// Replace rules register no items of their own; nothing to emit.
    fn finalize(
        &self,
        _key: &str,
        _item: &RegistryItem,
        _out: &EmitContext,
    ) -> Result<(), LinkError> {
        Ok(())
    }
}
