//! Override resolution: priority-ranked replacement rules.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LinkError;
use crate::priority::PriorityLevel;
use crate::registry::Registry;

/// A declared replacement: lookups of `must_replace` are redirected to the
/// item bound to `replace_with`.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    /// Key whose binding is overwritten.
    pub must_replace: String,
    /// Key naming the replacement item.
    pub replace_with: String,
    /// Rule precedence.
    pub priority: PriorityLevel,
    /// Declaring directory.
    pub path: PathBuf,
}

/// Accumulates replacement rules during scanning, keeping at most one active
/// rule per `must_replace` key.
#[derive(Debug, Default)]
pub struct ReplaceSet {
    rules: HashMap<String, ReplaceRule>,
}

impl ReplaceSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a rule. When a rule for the same `must_replace` key already
    /// exists, the new one wins only with strictly higher priority; ties and
    /// lower priorities are silently ignored, so the first declaration at a
    /// given priority sticks.
    pub fn add(&mut self, rule: ReplaceRule) {
        match self.rules.entry(rule.must_replace.clone()) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                if rule.priority > e.get().priority {
                    e.insert(rule);
                }
            }
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(rule);
            }
        }
    }

    /// Number of accumulated rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules were declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every rule to the registry. Runs exactly once, after scanning
    /// and before emission.
    ///
    /// This is a single pass over the rule set, NOT an iterate-to-fixpoint
    /// resolution. With chained rules (`A -> B` and `B -> C`), whether `A`
    /// ends up bound to `B`'s or `C`'s item depends on which rule the map
    /// happens to yield first; chains are not guaranteed to resolve
    /// transitively.
    ///
    /// # Errors
    ///
    /// Fails with [`LinkError::UnresolvedReference`] when either key of a
    /// rule is unbound, the message distinguishing UID-shaped keys from
    /// alias-shaped ones.
    pub fn apply(&self, registry: &mut Registry) -> Result<(), LinkError> {
        for rule in self.rules.values() {
            registry.require(&rule.must_replace, &rule.path)?;
            let target = Arc::clone(registry.require(&rule.replace_with, &rule.path)?);
            registry.rebind(&rule.must_replace, target);
        }
        Ok(())
    }
}
