//! Persisted agent state

use crate::belief::store::BeliefStore;
use crate::core::ids::AgentId;
use crate::desire::set::DesireSet;
use crate::intention::entities::IntentionSet;
use crate::resource::ResourcePool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything needed to resume an agent: beliefs, desires, intentions with
/// their plans, and resources, keyed by agent id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: AgentId,
    pub tick: u64,
    pub beliefs: BeliefStore,
    pub desires: DesireSet,
    pub intentions: IntentionSet,
    pub resources: ResourcePool,
    pub saved_at: DateTime<Utc>,
}
