//! Intention entities

use crate::core::error::DomainError;
use crate::core::ids::{DesireId, IntentionId};
use crate::desire::entities::{Desire, Precondition};
use crate::plan::entities::Plan;
use crate::resource::{ResourceMap, overlaps};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lifecycle of an intention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentionStatus {
    #[default]
    Active,
    /// Preconditions stopped holding; resumes when they hold again.
    Suspended,
    Completed,
    /// Replanning was exhausted or the executor failed.
    Failed,
}

impl IntentionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IntentionStatus::Active => "active",
            IntentionStatus::Suspended => "suspended",
            IntentionStatus::Completed => "completed",
            IntentionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IntentionStatus::Completed | IntentionStatus::Failed)
    }
}

/// A desire the agent committed to, optionally bound to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intention {
    pub id: IntentionId,
    pub desire_id: DesireId,
    pub goal: String,
    pub priority: f64,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub required_resources: ResourceMap,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub status: IntentionStatus,
}

impl Intention {
    pub fn from_desire(desire: &Desire) -> Self {
        Self {
            id: IntentionId::generate(),
            desire_id: desire.id.clone(),
            goal: desire.description.clone(),
            priority: desire.priority,
            urgency: desire.urgency,
            preconditions: desire.preconditions.clone(),
            required_resources: desire.required_resources.clone(),
            plan: None,
            status: IntentionStatus::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Same desire, or overlapping required resources.
    pub fn conflicts_with(&self, desire: &Desire) -> bool {
        self.desire_id == desire.id || overlaps(&self.required_resources, &desire.required_resources)
    }

    /// Fail the intention together with its plan.
    pub fn fail(&mut self) {
        self.status = IntentionStatus::Failed;
        if let Some(plan) = self.plan.as_mut() {
            plan.mark_failed();
        }
    }
}

/// The intentions an agent holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentionSet {
    intentions: Vec<Intention>,
}

impl IntentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an intention after checking no live intention shares its desire.
    pub fn commit(&mut self, intention: Intention) -> Result<&IntentionId, DomainError> {
        if self.live_for(&intention.desire_id).is_some() {
            return Err(DomainError::DuplicateIntention(intention.desire_id));
        }
        self.intentions.push(intention);
        let last = self.intentions.len() - 1;
        Ok(&self.intentions[last].id)
    }

    pub fn get(&self, id: &IntentionId) -> Option<&Intention> {
        self.intentions.iter().find(|i| &i.id == id)
    }

    pub fn get_mut(&mut self, id: &IntentionId) -> Option<&mut Intention> {
        self.intentions.iter_mut().find(|i| &i.id == id)
    }

    /// The live (non-terminal) intention for a desire, if any.
    pub fn live_for(&self, desire_id: &DesireId) -> Option<&Intention> {
        self.intentions
            .iter()
            .find(|i| &i.desire_id == desire_id && i.is_live())
    }

    pub fn active_count(&self) -> usize {
        self.intentions
            .iter()
            .filter(|i| i.status == IntentionStatus::Active)
            .count()
    }

    pub fn remove(&mut self, id: &IntentionId) -> Option<Intention> {
        let pos = self.intentions.iter().position(|i| &i.id == id)?;
        Some(self.intentions.remove(pos))
    }

    /// Take out every completed or failed intention.
    pub fn drain_terminal(&mut self) -> Vec<Intention> {
        let (terminal, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.intentions)
            .into_iter()
            .partition(|i| i.status.is_terminal());
        self.intentions = live;
        terminal
    }

    /// No two live intentions may reference the same desire.
    pub fn assert_unique_desires(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for intention in self.intentions.iter().filter(|i| i.is_live()) {
            if !seen.insert(&intention.desire_id) {
                return Err(DomainError::DuplicateIntention(intention.desire_id.clone()));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Intention> {
        self.intentions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Intention> {
        self.intentions.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.intentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intentions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_rejects_duplicate_live_intention() {
        let desire = Desire::new("patrol", 3.0).with_id("d1");
        let mut set = IntentionSet::new();
        set.commit(Intention::from_desire(&desire)).unwrap();
        assert_eq!(
            set.commit(Intention::from_desire(&desire)).unwrap_err(),
            DomainError::DuplicateIntention("d1".into())
        );
    }

    #[test]
    fn test_terminal_intention_frees_desire() {
        let desire = Desire::new("patrol", 3.0).with_id("d1");
        let mut set = IntentionSet::new();
        let id = set.commit(Intention::from_desire(&desire)).unwrap().clone();
        set.get_mut(&id).unwrap().fail();

        assert!(set.live_for(&"d1".into()).is_none());
        set.commit(Intention::from_desire(&desire)).unwrap();
        assert!(set.assert_unique_desires().is_ok());

        let drained = set.drain_terminal();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].id, id);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_conflicts_with() {
        let held = Intention::from_desire(&Desire::new("lift", 5.0).with_resource("arm", 1.0));
        assert!(held.conflicts_with(&Desire::new("wave", 6.0).with_resource("arm", 1.0)));
        assert!(!held.conflicts_with(&Desire::new("talk", 6.0).with_resource("voice", 1.0)));
        assert!(!held.conflicts_with(&Desire::new("think", 6.0)));
    }
}
