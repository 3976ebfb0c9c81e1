//! Phases of the cognitive cycle

use serde::{Deserialize, Serialize};

/// Phase of one tick of an agent's cognitive cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// Draining inbound messages and percepts
    Perceive,
    /// Revising beliefs, inference, consistency handling, message dispatch
    Revise,
    /// Generating desires from the post-revision beliefs
    GenerateDesires,
    /// Committing desires to intentions
    SelectIntentions,
    /// Building and repairing plans
    Plan,
    /// Running plan steps and requested actions
    Execute,
    /// Applying outcomes, sending replies, persisting
    Emit,
}

impl CyclePhase {
    pub const ALL: [CyclePhase; 7] = [
        CyclePhase::Perceive,
        CyclePhase::Revise,
        CyclePhase::GenerateDesires,
        CyclePhase::SelectIntentions,
        CyclePhase::Plan,
        CyclePhase::Execute,
        CyclePhase::Emit,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CyclePhase::Perceive => "perceive",
            CyclePhase::Revise => "revise",
            CyclePhase::GenerateDesires => "generate_desires",
            CyclePhase::SelectIntentions => "select_intentions",
            CyclePhase::Plan => "plan",
            CyclePhase::Execute => "execute",
            CyclePhase::Emit => "emit",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CyclePhase::Perceive => "Perceive",
            CyclePhase::Revise => "Revise",
            CyclePhase::GenerateDesires => "Generate Desires",
            CyclePhase::SelectIntentions => "Select Intentions",
            CyclePhase::Plan => "Plan",
            CyclePhase::Execute => "Execute",
            CyclePhase::Emit => "Emit",
        }
    }

    /// Check if this phase calls out to an oracle
    pub fn consults_oracle(&self) -> bool {
        matches!(
            self,
            CyclePhase::Revise | CyclePhase::GenerateDesires | CyclePhase::Plan
        )
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_order() {
        let names: Vec<_> = CyclePhase::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "perceive",
                "revise",
                "generate_desires",
                "select_intentions",
                "plan",
                "execute",
                "emit"
            ]
        );
    }

    #[test]
    fn test_consults_oracle() {
        assert!(CyclePhase::Plan.consults_oracle());
        assert!(!CyclePhase::Emit.consults_oracle());
    }
}
