//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod cycle;
mod executor;
mod logging;
mod ontology;
mod output;
mod persistence;

pub use agents::{FileAgentConfig, FileBelief};
pub use cycle::FileCycleConfig;
pub use executor::FileExecutorConfig;
pub use logging::FileLoggingConfig;
pub use ontology::FileOntologyConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use persistence::FilePersistenceConfig;

use bdi_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Cognitive cycle parameters shared by every agent
    pub cycle: FileCycleConfig,
    /// Concept taxonomy for consistency checking
    pub ontology: FileOntologyConfig,
    /// Event log and diagnostic log locations
    pub logging: FileLoggingConfig,
    /// Agent snapshots
    pub persistence: FilePersistenceConfig,
    /// Simulated environment
    pub executor: FileExecutorConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// The society
    pub agents: Vec<FileAgentConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Cycle parameters (out-of-range values fall back to defaults)
    /// 2. The ontology declaration
    /// 3. Every agent, and that agent ids are unique
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.cycle.to_cycle_config().1);
        issues.extend(self.ontology.validate());

        if self.agents.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptySection {
                    section: "agents".to_string(),
                },
                "no [[agents]] configured, nothing will run",
            ));
        }

        let mut seen = BTreeSet::new();
        for (index, agent) in self.agents.iter().enumerate() {
            issues.extend(agent.validate(index));
            if !agent.id.is_empty() && !seen.insert(agent.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateAgent {
                        id: agent.id.clone(),
                    },
                    format!("agent id '{}' is declared more than once", agent.id),
                ));
            }
        }

        let subscribed: BTreeSet<&str> = self
            .agents
            .iter()
            .flat_map(|a| a.subscriptions.iter().map(String::as_str))
            .collect();
        for agent in &self.agents {
            for topic in agent.publishes.iter().filter(|t| !subscribed.contains(t.as_str())) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownReference {
                        field: format!("agents.{}.publishes", agent.id),
                        value: topic.clone(),
                    },
                    format!(
                        "agent '{}' publishes to '{}' but no agent subscribes to it",
                        agent.id, topic
                    ),
                ));
            }
        }

        issues
    }

    pub fn agent(&self, id: &str) -> Option<&FileAgentConfig> {
        self.agents.iter().find(|a| a.id == id)
    }
}
