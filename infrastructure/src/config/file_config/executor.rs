//! Simulated executor configuration from TOML (`[executor]` section)

use serde::{Deserialize, Serialize};

/// Raw executor settings
///
/// ```toml
/// [executor]
/// failing_actions = ["go_to_dock"]
/// latency_ms = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutorConfig {
    /// Actions that always fail.
    pub failing_actions: Vec<String>,
    /// Simulated duration of every action.
    pub latency_ms: u64,
}
