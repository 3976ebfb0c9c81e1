//! Configuration file loading for bdi-agents
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `BDI_` environment variables (`BDI_CYCLE__MAX_REPLANS=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./bdi.toml` or `./.bdi.toml`
//! 4. Global: `$XDG_CONFIG_HOME/bdi-agents/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAgentConfig, FileBelief, FileConfig, FileCycleConfig, FileExecutorConfig,
    FileLoggingConfig, FileOntologyConfig, FileOutputConfig, FileOutputFormat,
    FilePersistenceConfig,
};
pub use loader::ConfigLoader;
