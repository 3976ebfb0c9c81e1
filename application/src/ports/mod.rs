//! Port definitions (interfaces for external systems)
//!
//! Every collaborator the cognitive cycle talks to is a trait here, with a
//! no-op implementation for tests and for agents that do without it.

pub mod action_executor;
pub mod agent_store;
pub mod cycle_logger;
pub mod cycle_progress;
pub mod planning_oracle;
pub mod reasoning_oracle;
