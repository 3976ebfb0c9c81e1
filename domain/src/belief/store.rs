//! An agent's belief base.

use super::consistency::{self, Inconsistency, ResolutionReport, ResolverRegistry};
use super::entities::{Belief, BeliefKey, Certainty};
use super::ontology::Ontology;
use crate::core::ids::BeliefId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of [`BeliefStore::revise`].
#[derive(Debug, Clone, PartialEq)]
pub enum RevisionOutcome {
    /// No belief had this key; the candidate was added.
    Inserted(BeliefId),
    /// An incumbent with the same key was overwritten in place.
    ///
    /// The incumbent keeps its id. `previous` is its state before the
    /// overwrite.
    Superseded { id: BeliefId, previous: Belief },
}

impl RevisionOutcome {
    pub fn id(&self) -> &BeliefId {
        match self {
            RevisionOutcome::Inserted(id) => id,
            RevisionOutcome::Superseded { id, .. } => id,
        }
    }

    /// True when the revision changed the stored value.
    pub fn changed_value(&self, new_value: &Value) -> bool {
        match self {
            RevisionOutcome::Inserted(_) => true,
            RevisionOutcome::Superseded { previous, .. } => &previous.value != new_value,
        }
    }
}

/// Set of beliefs with at most one belief per [`BeliefKey`].
///
/// Insertion order is preserved so that consistency checks and snapshots
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefStore {
    beliefs: Vec<Belief>,
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a list, folding duplicate keys through
    /// [`revise`](Self::revise).
    pub fn from_beliefs(beliefs: impl IntoIterator<Item = Belief>) -> Self {
        let mut store = Self::new();
        for belief in beliefs {
            store.revise(belief);
        }
        store
    }

    /// Add a candidate belief, superseding any incumbent with the same key.
    ///
    /// Supersession overwrites value, certainty, timestamp, and source, and
    /// clears a pending review flag; the incumbent's id is kept.
    pub fn revise(&mut self, candidate: Belief) -> RevisionOutcome {
        match self.beliefs.iter_mut().find(|b| b.key == candidate.key) {
            Some(incumbent) => {
                let previous = incumbent.clone();
                incumbent.value = candidate.value;
                incumbent.certainty = candidate.certainty;
                incumbent.timestamp = candidate.timestamp;
                incumbent.source = candidate.source;
                incumbent.review = None;
                RevisionOutcome::Superseded {
                    id: incumbent.id.clone(),
                    previous,
                }
            }
            None => {
                let id = candidate.id.clone();
                self.beliefs.push(candidate);
                RevisionOutcome::Inserted(id)
            }
        }
    }

    pub fn get(&self, key: &BeliefKey) -> Option<&Belief> {
        self.beliefs.iter().find(|b| &b.key == key)
    }

    pub fn get_by_id(&self, id: &BeliefId) -> Option<&Belief> {
        self.beliefs.iter().find(|b| &b.id == id)
    }

    /// Value of a named belief, if held.
    pub fn named_value(&self, name: &str) -> Option<&Value> {
        self.get(&BeliefKey::named(name)).map(|b| &b.value)
    }

    /// True when a non-flagged belief with this key is held with at least
    /// `min_certainty`.
    pub fn holds(&self, key: &BeliefKey, min_certainty: Certainty) -> bool {
        self.get(key)
            .is_some_and(|b| !b.is_flagged() && b.certainty.value() >= min_certainty.value())
    }

    pub fn remove(&mut self, id: &BeliefId) -> Option<Belief> {
        let pos = self.beliefs.iter().position(|b| &b.id == id)?;
        Some(self.beliefs.remove(pos))
    }

    pub fn forget(&mut self, key: &BeliefKey) -> Option<Belief> {
        let pos = self.beliefs.iter().position(|b| &b.key == key)?;
        Some(self.beliefs.remove(pos))
    }

    /// Flag a belief for review. Returns false if the id is unknown.
    pub fn flag(
        &mut self,
        id: &BeliefId,
        reason: impl Into<String>,
        counterpart: Option<BeliefId>,
    ) -> bool {
        match self.beliefs.iter_mut().find(|b| &b.id == id) {
            Some(belief) => {
                belief.flag(reason, counterpart);
                true
            }
            None => false,
        }
    }

    pub fn clear_flag(&mut self, id: &BeliefId) -> bool {
        match self.beliefs.iter_mut().find(|b| &b.id == id) {
            Some(belief) => belief.review.take().is_some(),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.iter()
    }

    /// Beliefs not flagged for review.
    pub fn active(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.iter().filter(|b| !b.is_flagged())
    }

    pub fn flagged(&self) -> impl Iterator<Item = &Belief> {
        self.beliefs.iter().filter(|b| b.is_flagged())
    }

    pub fn as_slice(&self) -> &[Belief] {
        &self.beliefs
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    pub fn check_consistency(&self, ontology: &dyn Ontology) -> Vec<Inconsistency> {
        consistency::detect(&self.beliefs, ontology)
    }

    pub fn resolve(
        &mut self,
        records: &[Inconsistency],
        ontology: &dyn Ontology,
        registry: &ResolverRegistry,
    ) -> ResolutionReport {
        registry.resolve_all(self, records, ontology)
    }
}
