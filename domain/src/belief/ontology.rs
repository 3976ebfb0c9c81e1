//! Ontology used by the consistency checker.
//!
//! The checker needs two answers from an ontology: whether two concepts are
//! mutually exclusive, and which of two beliefs is more specific. Anything
//! richer (OWL reasoning, graph databases) stays behind this trait.

use super::entities::Belief;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Concept compatibility and specificity answers.
pub trait Ontology: Send + Sync {
    /// True when nothing can be both `a` and `b`.
    fn mutually_exclusive(&self, a: &str, b: &str) -> bool;

    /// True when `a` is strictly more specific than `b`.
    fn is_more_specific(&self, a: &Belief, b: &Belief) -> bool;
}

/// An ontology that declares nothing: no concept excludes another.
pub struct NoOntology;

impl Ontology for NoOntology {
    fn mutually_exclusive(&self, _a: &str, _b: &str) -> bool {
        false
    }

    fn is_more_specific(&self, _a: &Belief, _b: &Belief) -> bool {
        false
    }
}

/// Single-inheritance is-a hierarchy with declared disjoint concepts.
///
/// Disjointness is inherited: if `animal` and `vehicle` are disjoint, so are
/// `dog` (is-a `animal`) and `car` (is-a `vehicle`). Specificity is the depth
/// of a concept in the hierarchy; a concept the taxonomy does not know has
/// depth 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyOntology {
    parents: BTreeMap<String, String>,
    disjoint: BTreeSet<(String, String)>,
}

impl TaxonomyOntology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_is_a(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.add_is_a(child, parent);
        self
    }

    pub fn with_disjoint(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.add_disjoint(a, b);
        self
    }

    pub fn add_is_a(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(child.into(), parent.into());
    }

    pub fn add_disjoint(&mut self, a: impl Into<String>, b: impl Into<String>) {
        let (a, b) = (a.into(), b.into());
        // stored in canonical order
        if a <= b {
            self.disjoint.insert((a, b));
        } else {
            self.disjoint.insert((b, a));
        }
    }

    /// Whether `concept` appears anywhere in the taxonomy.
    pub fn knows(&self, concept: &str) -> bool {
        self.parents.contains_key(concept)
            || self.parents.values().any(|p| p == concept)
            || self
                .disjoint
                .iter()
                .any(|(a, b)| a == concept || b == concept)
    }

    /// `concept` followed by its ancestors, nearest first.
    ///
    /// Stops at the first repeated concept so a cyclic declaration cannot
    /// loop forever.
    pub fn lineage(&self, concept: &str) -> Vec<String> {
        let mut chain = vec![concept.to_string()];
        let mut current = concept;
        while let Some(parent) = self.parents.get(current) {
            if chain.iter().any(|c| c == parent) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    pub fn depth(&self, concept: &str) -> usize {
        self.lineage(concept).len() - 1
    }

    fn declared_disjoint(&self, a: &str, b: &str) -> bool {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.disjoint.contains(&key)
    }
}

impl Ontology for TaxonomyOntology {
    fn mutually_exclusive(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let lineage_a = self.lineage(a);
        let lineage_b = self.lineage(b);
        // one subsumes the other: compatible
        if lineage_a.iter().any(|c| c == b) || lineage_b.iter().any(|c| c == a) {
            return false;
        }
        lineage_a
            .iter()
            .any(|x| lineage_b.iter().any(|y| self.declared_disjoint(x, y)))
    }

    fn is_more_specific(&self, a: &Belief, b: &Belief) -> bool {
        match (a.concept(), b.concept()) {
            (Some(ca), Some(cb)) => self.depth(ca) > self.depth(cb),
            _ => false,
        }
    }
}
