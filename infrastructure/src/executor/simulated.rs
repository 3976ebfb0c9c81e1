//! Simulated environment for running agent societies without actuators.

use async_trait::async_trait;
use bdi_application::ports::action_executor::{ActionError, ActionExecutor};
use bdi_domain::PlanStep;
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Executor that succeeds on every action except the configured failures.
#[derive(Debug, Default)]
pub struct SimulatedActionExecutor {
    failing: BTreeSet<String>,
    latency: Duration,
    executed: Mutex<Vec<String>>,
}

impl SimulatedActionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Actions attempted so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ActionExecutor for SimulatedActionExecutor {
    async fn execute(&self, step: &PlanStep) -> Result<bool, ActionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(step.action.clone());

        let succeeded = !self.failing.contains(&step.action);
        debug!(
            "Simulated {} ({}): {}",
            step.action,
            step.id,
            if succeeded { "ok" } else { "failed" }
        );
        Ok(succeeded)
    }
}
