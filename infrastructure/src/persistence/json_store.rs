//! JSON file implementation of the [`AgentStore`] port.
//!
//! One pretty-printed file per agent, `<dir>/<agent>.json`. Saves go through
//! a temporary file and a rename, so a crash mid-write leaves the previous
//! snapshot intact.

use async_trait::async_trait;
use bdi_application::ports::agent_store::{AgentStore, StoreError};
use bdi_domain::{AgentId, AgentSnapshot};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct JsonFileAgentStore {
    dir: PathBuf,
}

impl JsonFileAgentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `agent_id`'s snapshot.
    ///
    /// Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, agent_id: &AgentId) -> PathBuf {
        let stem: String = agent_id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", stem))
    }
}

#[async_trait]
impl AgentStore for JsonFileAgentStore {
    async fn save(&self, snapshot: &AgentSnapshot) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(&snapshot.agent_id);
        let tmp = path.with_extension("json.tmp");

        let content = serde_json::to_string_pretty(snapshot)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Saved {} at tick {} to {}", snapshot.agent_id, snapshot.tick, path.display());
        Ok(())
    }

    async fn load(&self, agent_id: &AgentId) -> Result<Option<AgentSnapshot>, StoreError> {
        let path = self.path_for(agent_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn list(&self) -> Result<Vec<AgentId>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut agents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<AgentSnapshot>(&content) {
                Ok(snapshot) => agents.push(snapshot.agent_id),
                Err(e) => warn!("Skipping unreadable snapshot {}: {}", path.display(), e),
            }
        }
        agents.sort();
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdi_domain::{Belief, BeliefStore, DesireSet, IntentionSet, ResourcePool};

    fn snapshot(agent: &str, tick: u64) -> AgentSnapshot {
        let mut beliefs = BeliefStore::new();
        beliefs.revise(Belief::named("battery", "low"));
        AgentSnapshot {
            agent_id: AgentId::new(agent),
            tick,
            beliefs,
            desires: DesireSet::new(),
            intentions: IntentionSet::new(),
            resources: ResourcePool::new().with("energy", 5.0),
            saved_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path().join("state"));

        store.save(&snapshot("robot", 7)).await.unwrap();
        let loaded = store.load(&"robot".into()).await.unwrap().unwrap();

        assert_eq!(loaded.tick, 7);
        assert_eq!(loaded.beliefs.named_value("battery"), Some(&serde_json::json!("low")));
        assert_eq!(loaded.resources.available("energy"), 5.0);
    }

    #[tokio::test]
    async fn test_load_missing_agent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path());
        assert!(store.load(&"ghost".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path());
        store.save(&snapshot("robot", 1)).await.unwrap();
        store.save(&snapshot("robot", 2)).await.unwrap();

        assert_eq!(store.load(&"robot".into()).await.unwrap().unwrap().tick, 2);
        assert!(!store.path_for(&"robot".into()).with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_list_returns_original_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path());
        store.save(&snapshot("b/worker", 1)).await.unwrap();
        store.save(&snapshot("a", 1)).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let agents = store.list().await.unwrap();
        assert_eq!(agents, vec![AgentId::new("a"), AgentId::new("b/worker")]);
        assert!(store.path_for(&"b/worker".into()).ends_with("b_worker.json"));
    }

    #[tokio::test]
    async fn test_list_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path().join("nope"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileAgentStore::new(dir.path());
        std::fs::write(store.path_for(&"robot".into()), "not json").unwrap();
        assert!(matches!(
            store.load(&"robot".into()).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
