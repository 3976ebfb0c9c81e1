//! Interpreting message content.
//!
//! Content is opaque JSON on the wire. These helpers read the shapes the
//! performative handlers understand:
//!
//! - INFORM: an object of `name: value` pairs, or `{"beliefs": [percept, ..]}`
//! - QUERY: a belief name, `{"name": ..}`, or `{"subject", "predicate", "object"}`
//! - REQUEST: an action name, or `{"action": ..}`
//! - PROPOSE: a [`Proposal`] object

use super::entities::Message;
use crate::belief::entities::{Belief, BeliefKey, Percept};
use crate::core::error::DomainError;
use crate::core::ids::{AgentId, DesireId};
use crate::desire::entities::{Desire, Effect, Precondition};
use crate::resource::ResourceMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of the named belief that holds the last content from a sender.
pub const INBOX_PREFIX: &str = "inbox:";

pub fn inbox_key(sender: &AgentId) -> BeliefKey {
    BeliefKey::named(format!("{}{}", INBOX_PREFIX, sender))
}

/// The belief every delivered message is revised into first.
pub fn inbox_belief(message: &Message) -> Belief {
    Belief::new(inbox_key(message.sender()), message.content().clone())
        .with_timestamp(message.timestamp())
        .with_source(message.sender().as_str())
}

/// Beliefs carried by structured INFORM content.
///
/// Unparseable entries of a `beliefs` array are skipped; scalar content
/// yields nothing beyond the inbox belief.
pub fn inform_beliefs(message: &Message) -> Vec<Belief> {
    let Value::Object(map) = message.content() else {
        return Vec::new();
    };
    let at = message.timestamp();
    let source = message.sender().as_str();

    if let Some(Value::Array(entries)) = map.get("beliefs") {
        return entries
            .iter()
            .filter_map(|entry| serde_json::from_value::<Percept>(entry.clone()).ok())
            .map(|percept| {
                let mut belief = percept.into_belief(at);
                belief.source = Some(source.to_string());
                belief
            })
            .collect();
    }

    map.iter()
        .map(|(name, value)| {
            Belief::named(name.clone(), value.clone())
                .with_timestamp(at)
                .with_source(source)
        })
        .collect()
}

/// The belief a QUERY asks about.
pub fn query_key(content: &Value) -> Option<BeliefKey> {
    match content {
        Value::String(name) => Some(BeliefKey::named(name.clone())),
        Value::Object(map) => {
            let field = |name: &str| map.get(name).and_then(Value::as_str);
            if let Some(name) = field("name") {
                return Some(BeliefKey::named(name));
            }
            match (field("subject"), field("predicate"), field("object")) {
                (Some(s), Some(p), Some(o)) => Some(BeliefKey::triple(s, p, o)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// The action a REQUEST asks for.
pub fn requested_action(content: &Value) -> Option<&str> {
    match content {
        Value::String(action) => Some(action.as_str()),
        Value::Object(map) => map.get("action").and_then(Value::as_str),
        _ => None,
    }
}

/// A desire offered to another agent with PROPOSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default)]
    pub id: Option<DesireId>,
    pub description: String,
    pub priority: f64,
    #[serde(default)]
    pub urgency: f64,
    #[serde(default)]
    pub resources: ResourceMap,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Proposal {
    pub fn new(description: impl Into<String>, priority: f64) -> Self {
        Self {
            id: None,
            description: description.into(),
            priority,
            urgency: 0.0,
            resources: ResourceMap::new(),
            preconditions: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn from_content(content: &Value) -> Result<Self, DomainError> {
        let proposal: Proposal = serde_json::from_value(content.clone())
            .map_err(|e| DomainError::InvalidProposal(e.to_string()))?;
        if !proposal.priority.is_finite() {
            return Err(DomainError::InvalidProposal(format!(
                "priority must be finite, got {}",
                proposal.priority
            )));
        }
        Ok(proposal)
    }

    pub fn into_desire(self) -> Desire {
        let mut desire = Desire::new(self.description, self.priority).with_urgency(self.urgency);
        if let Some(id) = self.id {
            desire.id = id;
        }
        desire.required_resources = self.resources;
        desire.preconditions = self.preconditions;
        desire.effects = self.effects;
        desire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::entities::Performative;
    use serde_json::json;

    fn inform(content: Value) -> Message {
        Message::new("sensor".into(), Performative::Inform, content)
    }

    #[test]
    fn test_inform_object_becomes_named_beliefs() {
        let beliefs = inform_beliefs(&inform(json!({"temp": 21, "humidity": 0.4})));
        assert_eq!(beliefs.len(), 2);
        assert!(beliefs.iter().all(|b| b.source.as_deref() == Some("sensor")));
        assert!(
            beliefs
                .iter()
                .any(|b| b.key == BeliefKey::named("temp") && b.value == json!(21))
        );
    }

    #[test]
    fn test_inform_beliefs_array() {
        let beliefs = inform_beliefs(&inform(json!({"beliefs": [
            {"key": {"kind": "triple", "subject": "light1", "predicate": "is", "object": "on"}, "value": true, "certainty": 0.7},
            {"nonsense": 1}
        ]})));
        assert_eq!(beliefs.len(), 1);
        assert_eq!(beliefs[0].key, BeliefKey::triple("light1", "is", "on"));
        assert_eq!(beliefs[0].certainty.value(), 0.7);
    }

    #[test]
    fn test_scalar_inform_carries_no_structured_beliefs() {
        assert!(inform_beliefs(&inform(json!("hello"))).is_empty());
        let message = inform(json!("hello"));
        let inbox = inbox_belief(&message);
        assert_eq!(inbox.key, BeliefKey::named("inbox:sensor"));
        assert_eq!(inbox.value, json!("hello"));
    }

    #[test]
    fn test_query_key_shapes() {
        assert_eq!(query_key(&json!("temp")), Some(BeliefKey::named("temp")));
        assert_eq!(
            query_key(&json!({"subject": "light1", "predicate": "is", "object": "on"})),
            Some(BeliefKey::triple("light1", "is", "on"))
        );
        assert_eq!(query_key(&json!(42)), None);
    }

    #[test]
    fn test_requested_action() {
        assert_eq!(requested_action(&json!("status")), Some("status"));
        assert_eq!(requested_action(&json!({"action": "charge"})), Some("charge"));
        assert_eq!(requested_action(&json!([1, 2])), None);
    }

    #[test]
    fn test_proposal_into_desire() {
        let proposal = Proposal::from_content(&json!({
            "id": "desire:help",
            "description": "help carry",
            "priority": 6.0,
            "resources": {"arm": 1.0}
        }))
        .unwrap();
        let desire = proposal.into_desire();
        assert_eq!(desire.id.as_str(), "desire:help");
        assert_eq!(desire.required_resources["arm"], 1.0);
    }

    #[test]
    fn test_malformed_proposal() {
        assert!(matches!(
            Proposal::from_content(&json!("do it")),
            Err(DomainError::InvalidProposal(_))
        ));
    }
}
