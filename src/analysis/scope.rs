//! Per-scope analysis state and the capture-avoiding scope merge.

use crate::analysis::algebra::{unique_name, Flow};
use std::collections::{BTreeSet, HashSet};

/// Accumulated variable classifications and flows for one syntactic scope
/// (a statement, a branch, a loop body, a method body).
#[derive(Debug, Clone, Default)]
pub struct ScopeState {
    /// Every identifier observed in this scope or merged from a child.
    pub vars: HashSet<String>,
    /// Identifiers introduced by a local declaration in this scope.
    pub declared: HashSet<String>,
    /// Identifiers written (assignment targets) in this scope.
    pub out: HashSet<String>,
    /// Identifiers occurring in `return` expressions.
    pub returned: HashSet<String>,
    /// Raw flow matrix; may contain duplicates until finalized.
    pub matrix: Vec<Flow>,
    /// Source text of statements/expressions the engine skipped.
    pub skipped: Vec<String>,
}

impl ScopeState {
    /// Substitute a variable name in place, across every set and flow pair.
    pub fn rename(&mut self, old: &str, new: &str) {
        for pair in &mut self.matrix {
            if pair.0 == old {
                pair.0 = new.to_string();
            }
            if pair.1 == old {
                pair.1 = new.to_string();
            }
        }
        for set in [
            &mut self.vars,
            &mut self.declared,
            &mut self.out,
            &mut self.returned,
        ] {
            if set.remove(old) {
                set.insert(new.to_string());
            }
        }
    }

    /// Merge a child scope into this one, renaming the child's local
    /// declarations wherever they would capture a name this scope already
    /// knows. After renaming, `vars ∩ child.declared` must be empty.
    pub fn merge_scoped(&mut self, mut child: ScopeState) {
        let captured: Vec<String> = self.vars.intersection(&child.declared).cloned().collect();
        for old in captured {
            // search against both scopes so the fresh name cannot collide
            // with anything the child already holds either
            let known: HashSet<String> = self.vars.union(&child.vars).cloned().collect();
            let fresh = unique_name(&old, &known);
            child.rename(&old, &fresh);
        }
        assert!(
            self.vars.is_disjoint(&child.declared),
            "scope merge left a captured declaration"
        );
        self.vars.extend(child.vars);
        self.declared.extend(child.declared);
        self.out.extend(child.out);
        self.returned.extend(child.returned);
        self.matrix.extend(child.matrix);
        self.skipped.extend(child.skipped);
    }

    /// Finalized flow set: the raw matrix deduplicated and ordered.
    pub fn flows(&self) -> BTreeSet<Flow> {
        self.matrix.iter().cloned().collect()
    }
}
