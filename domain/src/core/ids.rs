//! Identifier value objects.
//!
//! Every entity of the BDI model is addressed by a string newtype so that
//! ids coming from oracles, config files and the wire protocol can be used
//! without conversion, while still being distinct types in signatures.
//!
//! - [`AgentId`], [`BeliefId`], [`DesireId`], [`IntentionId`]
//! - [`PlanId`], [`StepId`]
//! - [`MessageId`], [`ConversationId`]

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generates a new random id (UUID v4).
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<T: Into<String>> From<T> for $name {
            fn from(s: T) -> Self {
                Self::new(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier of an agent; also its mailbox address on the bus.
    AgentId
);
string_id!(
    /// Identifier of a single belief inside a belief store.
    BeliefId
);
string_id!(
    /// Identifier of a desire. Template-generated desires use stable ids.
    DesireId
);
string_id!(IntentionId);
string_id!(PlanId);
string_id!(
    /// Identifier of a step, unique within its plan.
    StepId
);
string_id!(MessageId);
string_id!(
    /// Links a causally-related chain of messages.
    ConversationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        let a = BeliefId::generate();
        let b = BeliefId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_from_and_display() {
        let id: AgentId = "agent-a".into();
        assert_eq!(id.to_string(), "agent-a");
        assert_eq!(id.as_str(), "agent-a");
    }

    #[test]
    fn test_serializes_transparently() {
        let id = StepId::new("step-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"step-1\"");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(BeliefId::new("a") < BeliefId::new("b"));
    }
}
