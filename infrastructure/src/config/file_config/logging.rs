//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging settings
///
/// ```toml
/// [logging]
/// event_log = "logs/events.jsonl"
/// log_dir = "logs"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving every agent's cycle events.
    pub event_log: Option<PathBuf>,
    /// Directory for the daily rolling diagnostic log.
    pub log_dir: Option<PathBuf>,
}
