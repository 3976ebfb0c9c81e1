//! Cycle configuration from TOML (`[cycle]` section)

use bdi_application::CycleConfig;
use bdi_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw cognitive cycle settings
///
/// # Example
///
/// ```toml
/// [cycle]
/// max_active_intentions = 3
/// max_steps_per_tick = 4
/// min_precondition_certainty = 0.5
/// oracle_timeout_ms = 5000
/// max_replans = 3
/// max_intention_failures = 3
/// acknowledge_informs = false
/// min_proposal_priority = 0.0
/// tick_interval_ms = 500
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCycleConfig {
    pub max_active_intentions: usize,
    pub max_steps_per_tick: usize,
    pub min_precondition_certainty: f64,
    pub oracle_timeout_ms: u64,
    pub max_replans: u32,
    pub max_intention_failures: u32,
    pub acknowledge_informs: bool,
    pub min_proposal_priority: f64,
    pub tick_interval_ms: u64,
}

impl Default for FileCycleConfig {
    fn default() -> Self {
        let defaults = CycleConfig::default();
        Self {
            max_active_intentions: defaults.max_active_intentions,
            max_steps_per_tick: defaults.max_steps_per_tick,
            min_precondition_certainty: defaults.min_precondition_certainty,
            oracle_timeout_ms: defaults.oracle_timeout.as_millis() as u64,
            max_replans: defaults.max_replans,
            max_intention_failures: defaults.max_intention_failures,
            acknowledge_informs: defaults.acknowledge_informs,
            min_proposal_priority: defaults.min_proposal_priority,
            tick_interval_ms: defaults.tick_interval.as_millis() as u64,
        }
    }
}

impl FileCycleConfig {
    /// Convert to the application config.
    ///
    /// Out-of-range values fall back to the default and produce a warning.
    pub fn to_cycle_config(&self) -> (CycleConfig, Vec<ConfigIssue>) {
        let defaults = CycleConfig::default();
        let mut issues = Vec::new();

        let max_active_intentions = positive(
            self.max_active_intentions,
            defaults.max_active_intentions,
            "cycle.max_active_intentions",
            &mut issues,
        );
        let max_steps_per_tick = positive(
            self.max_steps_per_tick,
            defaults.max_steps_per_tick,
            "cycle.max_steps_per_tick",
            &mut issues,
        );
        let oracle_timeout_ms = positive(
            self.oracle_timeout_ms,
            defaults.oracle_timeout.as_millis() as u64,
            "cycle.oracle_timeout_ms",
            &mut issues,
        );
        let max_intention_failures = positive(
            self.max_intention_failures,
            defaults.max_intention_failures,
            "cycle.max_intention_failures",
            &mut issues,
        );

        let min_precondition_certainty = if (0.0..=1.0).contains(&self.min_precondition_certainty) {
            self.min_precondition_certainty
        } else {
            issues.push(invalid(
                "cycle.min_precondition_certainty",
                self.min_precondition_certainty,
                defaults.min_precondition_certainty,
                "must be within [0.0, 1.0]",
            ));
            defaults.min_precondition_certainty
        };

        let min_proposal_priority = if self.min_proposal_priority.is_finite() {
            self.min_proposal_priority
        } else {
            issues.push(invalid(
                "cycle.min_proposal_priority",
                self.min_proposal_priority,
                defaults.min_proposal_priority,
                "must be a finite number",
            ));
            defaults.min_proposal_priority
        };

        let config = CycleConfig {
            max_active_intentions,
            max_steps_per_tick,
            min_precondition_certainty,
            oracle_timeout: Duration::from_millis(oracle_timeout_ms),
            max_replans: self.max_replans,
            max_intention_failures,
            acknowledge_informs: self.acknowledge_informs,
            min_proposal_priority,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        };
        (config, issues)
    }
}

fn positive<T>(value: T, default: T, field: &str, issues: &mut Vec<ConfigIssue>) -> T
where
    T: PartialEq + Default + std::fmt::Display + Copy,
{
    if value == T::default() {
        issues.push(invalid(field, value, default, "must be greater than zero"));
        default
    } else {
        value
    }
}

fn invalid(
    field: &str,
    value: impl std::fmt::Display,
    default: impl std::fmt::Display,
    reason: &str,
) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        },
        format!("{}: {} {}, falling back to {}", field, value, reason, default),
    )
}
