//! Agent persistence port

use async_trait::async_trait;
use bdi_domain::{AgentId, AgentSnapshot};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Saves and restores agent state keyed by agent id.
#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn save(&self, snapshot: &AgentSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing was saved for `agent_id`.
    async fn load(&self, agent_id: &AgentId) -> Result<Option<AgentSnapshot>, StoreError>;

    async fn list(&self) -> Result<Vec<AgentId>, StoreError>;
}
