//! Per-run linking context.
//!
//! All mutable pipeline state lives here and is threaded explicitly through
//! scan, resolve, and emit — there is no process-global registry. The
//! context is created empty, populated during scanning, mutated once during
//! resolution, read-only during emission, and dropped at run end.

use std::path::PathBuf;

use crate::composite::CompositeSet;
use crate::registry::Registry;
use crate::replace::ReplaceSet;

/// State of one linking run.
#[derive(Debug, Default)]
pub struct LinkContext {
    /// Root of the scanned module tree.
    pub src_root: PathBuf,
    /// Identifier registry.
    pub registry: Registry,
    /// Accumulated replacement rules.
    pub replaces: ReplaceSet,
    /// Accumulated composite declarations.
    pub composites: CompositeSet,
}

impl LinkContext {
    /// Creates an empty context for the given source root.
    pub fn new(src_root: impl Into<PathBuf>) -> Self {
        Self { src_root: src_root.into(), ..Self::default() }
    }
}
