//! Persistence configuration from TOML (`[persistence]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw persistence settings
///
/// ```toml
/// [persistence]
/// state_dir = ".bdi/state"
/// resume = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersistenceConfig {
    /// Directory of per-agent snapshots. Unset disables persistence.
    pub state_dir: Option<PathBuf>,
    /// Restore agents from their last snapshot at startup.
    pub resume: bool,
}
