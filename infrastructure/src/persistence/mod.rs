//! Persistence adapters for agent state.

mod json_store;

pub use json_store::JsonFileAgentStore;
