//! Cycle parameters: cognitive cycle control.
//!
//! [`CycleConfig`] groups the static parameters that control each tick of
//! the [`CognitiveCycle`](crate::use_cases::cognitive_cycle::CognitiveCycle).

use bdi_domain::{Certainty, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleConfig {
    /// Active intentions an agent may hold at once.
    pub max_active_intentions: usize,
    /// Plan steps executed per tick across all intentions.
    pub max_steps_per_tick: usize,
    /// Default certainty a belief needs to satisfy a precondition.
    pub min_precondition_certainty: f64,
    /// Deadline of every oracle call.
    pub oracle_timeout: Duration,
    /// Replans allowed per plan before the intention fails.
    pub max_replans: u32,
    /// Failed intentions after which a desire is suspended.
    pub max_intention_failures: u32,
    /// Answer INFORM with AGREE.
    pub acknowledge_informs: bool,
    /// Lowest priority a PROPOSE may carry and still be accepted.
    pub min_proposal_priority: f64,
    /// Cadence of the runtime loop.
    pub tick_interval: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            max_active_intentions: 3,
            max_steps_per_tick: 4,
            min_precondition_certainty: 0.5,
            oracle_timeout: Duration::from_secs(5),
            max_replans: 3,
            max_intention_failures: 3,
            acknowledge_informs: false,
            min_proposal_priority: 0.0,
            tick_interval: Duration::from_millis(500),
        }
    }
}

impl CycleConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_active_intentions(mut self, max: usize) -> Self {
        self.max_active_intentions = max;
        self
    }

    pub fn with_max_steps_per_tick(mut self, max: usize) -> Self {
        self.max_steps_per_tick = max;
        self
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    pub fn with_max_replans(mut self, max: u32) -> Self {
        self.max_replans = max;
        self
    }

    pub fn with_max_intention_failures(mut self, max: u32) -> Self {
        self.max_intention_failures = max;
        self
    }

    pub fn with_acknowledge_informs(mut self, enabled: bool) -> Self {
        self.acknowledge_informs = enabled;
        self
    }

    pub fn with_min_proposal_priority(mut self, priority: f64) -> Self {
        self.min_proposal_priority = priority;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn precondition_threshold(&self) -> Certainty {
        Certainty::saturating(self.min_precondition_certainty)
    }

    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            max_active_intentions: self.max_active_intentions,
            min_precondition_certainty: self.precondition_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CycleConfig::default();
        assert_eq!(config.max_active_intentions, 3);
        assert_eq!(config.max_replans, 3);
        assert!(!config.acknowledge_informs);
        assert_eq!(config.oracle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_methods() {
        let config = CycleConfig::default()
            .with_max_active_intentions(1)
            .with_oracle_timeout(Duration::from_millis(50))
            .with_acknowledge_informs(true);
        assert_eq!(config.max_active_intentions, 1);
        assert_eq!(config.oracle_timeout, Duration::from_millis(50));
        assert!(config.acknowledge_informs);
    }

    #[test]
    fn test_selection_policy_clamps_threshold() {
        let mut config = CycleConfig::default();
        config.min_precondition_certainty = 1.4;
        assert_eq!(config.selection_policy().min_precondition_certainty.value(), 1.0);
    }
}
