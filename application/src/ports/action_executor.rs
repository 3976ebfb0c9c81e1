//! Action executor port
//!
//! Runs a single plan step (or a requested action) against the agent's
//! environment.

use async_trait::async_trait;
use bdi_domain::PlanStep;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Action '{action}' failed: {message}")]
    ExecutionFailed { action: String, message: String },
}

/// Executes plan steps.
///
/// `Ok(false)` is an ordinary step failure and triggers replanning;
/// `Err` means the executor itself broke and fails the intention.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(&self, step: &PlanStep) -> Result<bool, ActionError>;
}

/// Executor that reports every step as done.
pub struct NoopExecutor;

#[async_trait]
impl ActionExecutor for NoopExecutor {
    async fn execute(&self, _step: &PlanStep) -> Result<bool, ActionError> {
        Ok(true)
    }
}
