//! Category kinds and the staged linking pipeline.
//!
//! A category kind binds a root name (`defines` for `@defines`, and so on)
//! to a scan hook that populates the run context and a finalize hook that
//! writes artifacts for resolved items. The built-in kinds cover defines,
//! replaces, and composites; additional kinds can be registered before
//! scanning starts without touching the scanner or the resolvers.

pub mod composites;
pub mod defines;
pub mod replaces;

use std::collections::BTreeMap;
use std::path::Path;

use crate::context::LinkContext;
use crate::emit::EmitContext;
use crate::error::LinkError;
use crate::registry::RegistryItem;
use crate::scanner;

/// One pluggable category kind.
pub trait Category {
    /// Category root name; the scanned directory is `@<name>`.
    fn name(&self) -> &str;

    /// Populates the context from one category root. Invoked once per module
    /// that carries the category's directory.
    ///
    /// # Errors
    ///
    /// Any scan or validation failure aborts the run.
    fn scan(&self, ctx: &mut LinkContext, category_root: &Path) -> Result<(), LinkError>;

    /// Produces the build artifact for one resolved key. Invoked once per
    /// registry key of this kind during emission.
    ///
    /// # Errors
    ///
    /// Any write failure aborts the run.
    fn finalize(&self, key: &str, item: &RegistryItem, out: &EmitContext)
        -> Result<(), LinkError>;
}

/// Emission summary: keys written per category kind.
#[derive(Debug, Default)]
pub struct EmitReport {
    /// Emitted key count per category name.
    pub keys: BTreeMap<String, usize>,
}

impl EmitReport {
    /// Total number of emitted keys.
    #[must_use]
    pub fn total(&self) -> usize {
        self.keys.values().sum()
    }
}

/// The scan → resolve → emit pipeline over a set of registered category
/// kinds.
pub struct Pipeline {
    categories: Vec<Box<dyn Category>>,
}

impl Pipeline {
    /// Creates a pipeline with the three standard kinds: defines, replaces,
    /// composites.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            categories: vec![
                Box::new(defines::Defines),
                Box::new(replaces::Replaces),
                Box::new(composites::Composites),
            ],
        }
    }

    /// Creates a pipeline with no categories; combine with [`register`].
    ///
    /// [`register`]: Pipeline::register
    #[must_use]
    pub fn empty() -> Self {
        Self { categories: Vec::new() }
    }

    /// Registers an additional category kind. Must happen before [`run`];
    /// this is the pre-scan extension point.
    ///
    /// [`run`]: Pipeline::run
    pub fn register(&mut self, category: Box<dyn Category>) {
        self.categories.push(category);
    }

    /// Runs the scan and resolve stages: walks every module under the
    /// context's source root, lets each category scan its roots, then
    /// applies replace rules and resolves composites. After a successful
    /// return the registry is final and emission may begin.
    ///
    /// # Errors
    ///
    /// The first validation failure aborts the run; no artifact has been
    /// written at that point.
    pub fn run(&self, ctx: &mut LinkContext) -> Result<(), LinkError> {
        self.scan(ctx)?;
        let LinkContext { registry, replaces, composites, .. } = ctx;
        replaces.apply(registry)?;
        composites.resolve(registry)?;
        Ok(())
    }

    /// Runs the emit stage: every resolved key, in sorted order, is passed
    /// to its category's finalize hook with `output_root` as the artifact
    /// location.
    ///
    /// # Errors
    ///
    /// Propagates the first finalize failure.
    pub fn emit(&self, ctx: &LinkContext, output_root: &Path) -> Result<EmitReport, LinkError> {
        let out = EmitContext { output_root: output_root.to_path_buf() };
        let mut report = EmitReport::default();
        for (key, item) in ctx.registry.iter_sorted() {
            if let Some(category) = self.categories.iter().find(|c| c.name() == item.category) {
                category.finalize(key, item, &out)?;
                *report.keys.entry(item.category.clone()).or_default() += 1;
            }
        }
        Ok(report)
    }

    /// Walks module directories under the source root and dispatches each
    /// present category root to its kind, category by category, module by
    /// module.
    fn scan(&self, ctx: &mut LinkContext) -> Result<(), LinkError> {
        let src_root = ctx.src_root.clone();
        if !src_root.is_dir() {
            return Err(LinkError::io(
                &src_root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "source root not found"),
            ));
        }
        for category in &self.categories {
            for entry in scanner::list_entries(&src_root)? {
                let entry = scanner::auto_rename(&src_root, entry)?;
                if entry.is_symlink || scanner::is_disabled(&entry.name) || !entry.is_dir {
                    continue;
                }
                let root = entry.path.join(format!("@{}", category.name()));
                if root.is_dir() {
                    category.scan(ctx, &root)?;
                }
            }
        }
        Ok(())
    }
}

/// Iterates the item-type subdirectories of a category root, skipping
/// disabled entries, files, and symlinks.
pub(crate) fn for_each_item_type(
    root: &Path,
    mut f: impl FnMut(&str, &Path) -> Result<(), LinkError>,
) -> Result<(), LinkError> {
    for entry in scanner::list_entries(root)? {
        if entry.is_symlink || scanner::is_disabled(&entry.name) || !entry.is_dir {
            continue;
        }
        f(&entry.name, &entry.path)?;
    }
    Ok(())
}
