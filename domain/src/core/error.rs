//! Domain error types

use super::ids::{DesireId, PlanId, StepId};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Certainty must be within [0.0, 1.0], got {0}")]
    InvalidCertainty(f64),

    #[error("Unknown plan step: {0}")]
    UnknownStep(StepId),

    #[error("Step {step} cannot complete before step {blocking}")]
    StepOutOfOrder { step: StepId, blocking: StepId },

    #[error("Plan {0} is already completed")]
    PlanCompleted(PlanId),

    #[error("Insufficient resource '{resource}': required {required}, available {available}")]
    InsufficientResource {
        resource: String,
        required: f64,
        available: f64,
    },

    #[error("Desire {0} is referenced by more than one live intention")]
    DuplicateIntention(DesireId),

    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),
}

impl DomainError {
    /// Check if this error leaves the plan untouched and may be retried later
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::InsufficientResource { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_certainty_display() {
        let error = DomainError::InvalidCertainty(1.5);
        assert_eq!(
            error.to_string(),
            "Certainty must be within [0.0, 1.0], got 1.5"
        );
    }

    #[test]
    fn test_is_retryable() {
        let shortage = DomainError::InsufficientResource {
            resource: "cpu".to_string(),
            required: 2.0,
            available: 1.0,
        };
        assert!(shortage.is_retryable());
        assert!(!DomainError::PlanCompleted("plan-1".into()).is_retryable());
        assert!(!DomainError::UnknownStep("s".into()).is_retryable());
    }
}
