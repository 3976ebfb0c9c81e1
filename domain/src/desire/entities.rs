//! Desire entities

use crate::belief::entities::{Belief, BeliefKey, Certainty};
use crate::core::ids::DesireId;
use crate::resource::ResourceMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Lifecycle of a desire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesireStatus {
    #[default]
    Active,
    /// Not considered for selection (too many failed intentions).
    Suspended,
    Satisfied,
}

impl DesireStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DesireStatus::Active => "active",
            DesireStatus::Suspended => "suspended",
            DesireStatus::Satisfied => "satisfied",
        }
    }
}

/// A condition over the belief set.
///
/// Met when a non-flagged belief with `key` exists whose certainty reaches
/// the threshold and, if `expected` is set, whose value equals it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precondition {
    pub key: BeliefKey,
    #[serde(default)]
    pub expected: Option<Value>,
    /// Overrides the cycle-wide default threshold.
    #[serde(default)]
    pub min_certainty: Option<Certainty>,
}

impl Precondition {
    pub fn holds(key: BeliefKey) -> Self {
        Self {
            key,
            expected: None,
            min_certainty: None,
        }
    }

    pub fn equals(key: BeliefKey, expected: impl Into<Value>) -> Self {
        Self {
            key,
            expected: Some(expected.into()),
            min_certainty: None,
        }
    }

    pub fn with_min_certainty(mut self, certainty: Certainty) -> Self {
        self.min_certainty = Some(certainty);
        self
    }

    pub fn is_met(&self, beliefs: &[Belief], default_min: Certainty) -> bool {
        let threshold = self.min_certainty.unwrap_or(default_min).value();
        beliefs.iter().any(|b| {
            b.key == self.key
                && !b.is_flagged()
                && b.certainty.value() >= threshold
                && self.expected.as_ref().is_none_or(|v| &b.value == v)
        })
    }
}

/// True when every precondition is met.
pub fn all_met(preconditions: &[Precondition], beliefs: &[Belief], default_min: Certainty) -> bool {
    preconditions.iter().all(|p| p.is_met(beliefs, default_min))
}

/// A belief asserted once the desire is achieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub key: BeliefKey,
    #[serde(default = "default_effect_value")]
    pub value: Value,
}

fn default_effect_value() -> Value {
    Value::Bool(true)
}

impl Effect {
    pub fn new(key: BeliefKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }

    pub fn to_belief(&self, source: &str) -> Belief {
        Belief::new(self.key.clone(), self.value.clone()).with_source(source)
    }
}

/// A candidate goal with a priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Desire {
    pub id: DesireId,
    pub description: String,
    pub priority: f64,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default)]
    pub status: DesireStatus,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub required_resources: ResourceMap,
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// How many intentions for this desire have failed.
    #[serde(default)]
    pub failures: u32,
}

impl Desire {
    pub fn new(description: impl Into<String>, priority: f64) -> Self {
        Self {
            id: DesireId::generate(),
            description: description.into(),
            priority,
            urgency: 0.0,
            status: DesireStatus::Active,
            preconditions: Vec::new(),
            required_resources: ResourceMap::new(),
            effects: Vec::new(),
            failures: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<DesireId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_urgency(mut self, urgency: f64) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.preconditions.push(precondition);
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.required_resources.insert(name.into(), amount);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == DesireStatus::Active
    }

    pub fn preconditions_met(&self, beliefs: &[Belief], default_min: Certainty) -> bool {
        all_met(&self.preconditions, beliefs, default_min)
    }

    /// Selection order: higher priority first, ties by id.
    pub fn selection_order(&self, other: &Desire) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn threshold() -> Certainty {
        Certainty::new(0.5).unwrap()
    }

    #[test]
    fn test_precondition_value_and_certainty() {
        let beliefs = vec![
            Belief::named("battery", "charged").with_certainty(Certainty::new(0.8).unwrap()),
        ];
        let charged = Precondition::equals(BeliefKey::named("battery"), "charged");
        assert!(charged.is_met(&beliefs, threshold()));
        assert!(!charged.is_met(&beliefs, Certainty::new(0.9).unwrap()));

        let empty = Precondition::equals(BeliefKey::named("battery"), "empty");
        assert!(!empty.is_met(&beliefs, threshold()));

        let any = Precondition::holds(BeliefKey::named("battery"))
            .with_min_certainty(Certainty::new(0.85).unwrap());
        assert!(!any.is_met(&beliefs, threshold()));
    }

    #[test]
    fn test_flagged_belief_does_not_satisfy() {
        let mut belief = Belief::triple("door", "is", "open");
        belief.flag("review", None);
        let pre = Precondition::holds(BeliefKey::triple("door", "is", "open"));
        assert!(!pre.is_met(&[belief], threshold()));
    }

    #[test]
    fn test_selection_order() {
        let mut desires = vec![
            Desire::new("low", 1.0).with_id("a"),
            Desire::new("high", 9.0).with_id("c"),
            Desire::new("high-too", 9.0).with_id("b"),
        ];
        desires.sort_by(|a, b| a.selection_order(b));
        let ids: Vec<_> = desires.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_desire_deserializes_with_defaults() {
        let desire: Desire = serde_json::from_value(json!({
            "id": "d-1",
            "description": "recharge",
            "priority": 4.0
        }))
        .unwrap();
        assert_eq!(desire.status, DesireStatus::Active);
        assert!(desire.preconditions.is_empty());
        assert_eq!(desire.failures, 0);
    }

    #[test]
    fn test_effect_default_value() {
        let effect: Effect = serde_json::from_value(json!({
            "key": {"kind": "named", "name": "room_clean"}
        }))
        .unwrap();
        assert_eq!(effect.value, json!(true));
        assert_eq!(effect.to_belief("agent-1").source.as_deref(), Some("agent-1"));
    }
}
