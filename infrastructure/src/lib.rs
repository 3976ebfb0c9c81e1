//! Infrastructure layer for bdi-agents
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, configuration file loading, and the assembly
//! of a configured agent society.

pub mod config;
pub mod executor;
pub mod logging;
pub mod oracles;
pub mod persistence;
pub mod society;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileBelief, FileConfig, FileCycleConfig, FileExecutorConfig,
    FileLoggingConfig, FileOntologyConfig, FileOutputConfig, FileOutputFormat,
    FilePersistenceConfig,
};
pub use executor::SimulatedActionExecutor;
pub use logging::JsonlCycleLogger;
pub use oracles::{InferenceRule, PlanLibraryOracle, RuleReasoningOracle};
pub use persistence::JsonFileAgentStore;
pub use society::{Society, SocietyError, SocietyOptions};
