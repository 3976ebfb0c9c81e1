//! Rule-based desire generation from an agent profile.

use super::entities::{Desire, Effect, Precondition, all_met};
use crate::belief::entities::{Belief, Certainty};
use crate::core::ids::DesireId;
use crate::resource::ResourceMap;
use serde::{Deserialize, Serialize};

/// Prefix of the stable id given to template-generated desires.
pub const TEMPLATE_ID_PREFIX: &str = "desire:";

/// A desire an agent adopts whenever its trigger conditions hold.
///
/// The template fires when every `when` condition is met and the
/// `satisfied_when` condition (if any) is not. The generated desire always
/// has the id `desire:<name>`, so regenerating it on a later tick refers to
/// the same desire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesireTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: f64,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default)]
    pub when: Vec<Precondition>,
    #[serde(default)]
    pub satisfied_when: Option<Precondition>,
    /// Conditions the intention needs to stay achievable.
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub resources: ResourceMap,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl DesireTemplate {
    pub fn new(name: impl Into<String>, priority: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            priority,
            urgency: 0.0,
            when: Vec::new(),
            satisfied_when: None,
            preconditions: Vec::new(),
            resources: ResourceMap::new(),
            effects: Vec::new(),
        }
    }

    pub fn when(mut self, condition: Precondition) -> Self {
        self.when.push(condition);
        self
    }

    pub fn satisfied_when(mut self, condition: Precondition) -> Self {
        self.satisfied_when = Some(condition);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn desire_id(&self) -> DesireId {
        DesireId::new(format!("{}{}", TEMPLATE_ID_PREFIX, self.name))
    }

    pub fn fires(&self, beliefs: &[Belief], default_min: Certainty) -> bool {
        all_met(&self.when, beliefs, default_min)
            && !self
                .satisfied_when
                .as_ref()
                .is_some_and(|s| s.is_met(beliefs, default_min))
    }

    pub fn instantiate(&self) -> Desire {
        Desire {
            id: self.desire_id(),
            description: self.description.clone().unwrap_or_else(|| self.name.clone()),
            priority: self.priority,
            urgency: self.urgency,
            status: Default::default(),
            preconditions: self.preconditions.clone(),
            required_resources: self.resources.clone(),
            effects: self.effects.clone(),
            failures: 0,
        }
    }
}

/// Desires produced by every template that fires over `beliefs`.
pub fn evaluate_templates(
    templates: &[DesireTemplate],
    beliefs: &[Belief],
    default_min: Certainty,
) -> Vec<Desire> {
    templates
        .iter()
        .filter(|t| t.fires(beliefs, default_min))
        .map(DesireTemplate::instantiate)
        .collect()
}
