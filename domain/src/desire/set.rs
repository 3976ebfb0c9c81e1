//! The set of desires an agent currently holds.

use super::entities::{Desire, DesireStatus};
use crate::core::ids::DesireId;
use serde::{Deserialize, Serialize};

/// Desires keyed by id, in adoption order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesireSet {
    desires: Vec<Desire>,
}

impl DesireSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `generated` into the set and return how many were new.
    ///
    /// A regenerated desire refreshes description, priority, urgency,
    /// preconditions, resources, and effects. Its status and failure count
    /// are kept.
    pub fn merge(&mut self, generated: impl IntoIterator<Item = Desire>) -> usize {
        let mut added = 0;
        for desire in generated {
            match self.get_mut(&desire.id) {
                Some(existing) => {
                    existing.description = desire.description;
                    existing.priority = desire.priority;
                    existing.urgency = desire.urgency;
                    existing.preconditions = desire.preconditions;
                    existing.required_resources = desire.required_resources;
                    existing.effects = desire.effects;
                }
                None => {
                    self.desires.push(desire);
                    added += 1;
                }
            }
        }
        added
    }

    /// Add a desire; returns false if its id is already held.
    pub fn adopt(&mut self, desire: Desire) -> bool {
        if self.contains(&desire.id) {
            return false;
        }
        self.desires.push(desire);
        true
    }

    pub fn contains(&self, id: &DesireId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &DesireId) -> Option<&Desire> {
        self.desires.iter().find(|d| &d.id == id)
    }

    pub fn get_mut(&mut self, id: &DesireId) -> Option<&mut Desire> {
        self.desires.iter_mut().find(|d| &d.id == id)
    }

    /// Active desires in selection order (priority descending, ties by id).
    pub fn active_by_priority(&self) -> Vec<&Desire> {
        let mut active: Vec<_> = self.desires.iter().filter(|d| d.is_active()).collect();
        active.sort_by(|a, b| a.selection_order(b));
        active
    }

    pub fn mark_satisfied(&mut self, id: &DesireId) -> bool {
        match self.get_mut(id) {
            Some(desire) => {
                desire.status = DesireStatus::Satisfied;
                true
            }
            None => false,
        }
    }

    /// Count a failed intention against the desire. Returns true when this
    /// failure suspended it.
    pub fn record_failure(&mut self, id: &DesireId, max_failures: u32) -> bool {
        let Some(desire) = self.get_mut(id) else {
            return false;
        };
        desire.failures += 1;
        if desire.failures >= max_failures && desire.status == DesireStatus::Active {
            desire.status = DesireStatus::Suspended;
            return true;
        }
        false
    }

    /// Drop satisfied desires and return them.
    pub fn remove_satisfied(&mut self) -> Vec<Desire> {
        let (satisfied, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.desires)
            .into_iter()
            .partition(|d| d.status == DesireStatus::Satisfied);
        self.desires = kept;
        satisfied
    }

    pub fn iter(&self) -> impl Iterator<Item = &Desire> {
        self.desires.iter()
    }

    pub fn len(&self) -> usize {
        self.desires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.desires.is_empty()
    }
}

impl FromIterator<Desire> for DesireSet {
    fn from_iter<T: IntoIterator<Item = Desire>>(iter: T) -> Self {
        let mut set = DesireSet::new();
        set.merge(iter);
        set
    }
}
