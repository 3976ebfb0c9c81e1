//! Assembles a runnable agent society from a [`FileConfig`].
//!
//! Every agent gets its own oracles built from its declaration (inference
//! rules, plan library), the simulated executor, and, when a state directory
//! is configured, the JSON file store. The bus, event logger and progress
//! notifier are shared.

use crate::config::{FileAgentConfig, FileConfig};
use crate::executor::SimulatedActionExecutor;
use crate::oracles::{PlanLibraryOracle, RuleReasoningOracle};
use crate::persistence::JsonFileAgentStore;
use bdi_application::{
    AgentPorts, AgentRuntime, AgentStore, CognitiveCycle, CommunicationError, CycleConfig,
    CycleError, CycleLogger, CycleProgressNotifier, MessageBus, NoCycleLogger, NoCycleProgress,
};
use bdi_domain::{AgentId, Certainty, ConfigIssue, Ontology, Severity};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Error, Debug)]
pub enum SocietyError {
    #[error("Invalid configuration:\n  {}", .0.join("\n  "))]
    InvalidConfig(Vec<String>),

    #[error("Agent '{agent}': {source}")]
    Agent {
        agent: String,
        #[source]
        source: CycleError,
    },
}

impl SocietyError {
    fn agent(agent: &str, source: impl Into<CycleError>) -> Self {
        Self::Agent {
            agent: agent.to_string(),
            source: source.into(),
        }
    }
}

/// Run-wide overrides and shared collaborators.
#[derive(Clone)]
pub struct SocietyOptions {
    pub max_ticks: Option<u64>,
    /// Overrides `cycle.tick_interval_ms`.
    pub interval: Option<Duration>,
    pub logger: Arc<dyn CycleLogger>,
    pub progress: Arc<dyn CycleProgressNotifier>,
    pub cancellation_token: CancellationToken,
}

impl Default for SocietyOptions {
    fn default() -> Self {
        Self {
            max_ticks: None,
            interval: None,
            logger: Arc::new(NoCycleLogger),
            progress: Arc::new(NoCycleProgress),
            cancellation_token: CancellationToken::new(),
        }
    }
}

impl SocietyOptions {
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn CycleLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn CycleProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }
}

/// Agents ready to run, sharing one bus.
pub struct Society {
    pub bus: Arc<MessageBus>,
    pub runtimes: Vec<AgentRuntime>,
    /// Agents restored from a snapshot.
    pub resumed: Vec<String>,
    /// Warnings found while validating the configuration.
    pub warnings: Vec<ConfigIssue>,
}

impl Society {
    /// Validate `config` and build one runtime per declared agent.
    ///
    /// Any error-severity issue refuses the whole society.
    pub async fn build(
        config: &FileConfig,
        options: SocietyOptions,
    ) -> Result<Self, SocietyError> {
        let issues = config.validate();
        if ConfigIssue::has_errors(&issues) {
            return Err(SocietyError::InvalidConfig(
                issues
                    .iter()
                    .filter(|i| i.severity == Severity::Error)
                    .map(|i| i.message.clone())
                    .collect(),
            ));
        }

        let (cycle_config, _) = config.cycle.to_cycle_config();
        let ontology: Arc<dyn Ontology> = Arc::new(config.ontology.to_ontology());
        let store: Option<Arc<dyn AgentStore>> = config
            .persistence
            .state_dir
            .as_ref()
            .map(|dir| Arc::new(JsonFileAgentStore::new(dir.clone())) as Arc<dyn AgentStore>);

        let bus = Arc::new(MessageBus::new());
        let mut runtimes = Vec::with_capacity(config.agents.len());
        let mut resumed = Vec::new();

        for agent in &config.agents {
            let ports = Self::ports(config, agent, &cycle_config, store.clone(), &options);
            let agent_id = AgentId::new(agent.id.as_str());
            let mut cycle = CognitiveCycle::new(agent_id, agent.to_profile(), bus.clone(), ports)
                .map_err(|e| SocietyError::agent(&agent.id, e))?
                .with_config(cycle_config.clone())
                .with_ontology(ontology.clone())
                .with_resources(agent.to_resources())
                .with_beliefs(agent.initial_beliefs());

            for topic in &agent.subscriptions {
                cycle
                    .subscribe(topic)
                    .map_err(|e: CommunicationError| SocietyError::agent(&agent.id, e))?;
            }

            if config.persistence.resume
                && cycle
                    .resume()
                    .await
                    .map_err(|e| SocietyError::agent(&agent.id, e))?
            {
                info!("Resumed {} at tick {}", agent.id, cycle.ticks());
                resumed.push(agent.id.clone());
            }

            let mut runtime =
                AgentRuntime::new(cycle).with_cancellation(options.cancellation_token.clone());
            if let Some(interval) = options.interval {
                runtime = runtime.with_interval(interval);
            }
            if let Some(ticks) = options.max_ticks {
                runtime = runtime.with_max_ticks(ticks);
            }
            runtimes.push(runtime);
        }

        Ok(Self {
            bus,
            runtimes,
            resumed,
            warnings: issues,
        })
    }

    fn ports(
        config: &FileConfig,
        agent: &FileAgentConfig,
        cycle_config: &CycleConfig,
        store: Option<Arc<dyn AgentStore>>,
        options: &SocietyOptions,
    ) -> AgentPorts {
        let reasoning = RuleReasoningOracle::new(agent.rules.clone())
            .with_min_certainty(Certainty::saturating(cycle_config.min_precondition_certainty));
        let planning = PlanLibraryOracle::new(agent.plans.clone());

        let executor = SimulatedActionExecutor::new()
            .with_failing(config.executor.failing_actions.iter().cloned())
            .with_latency(Duration::from_millis(config.executor.latency_ms));

        let mut ports = AgentPorts::default()
            .with_reasoning(Arc::new(reasoning))
            .with_planning(Arc::new(planning))
            .with_executor(Arc::new(executor))
            .with_logger(options.logger.clone())
            .with_progress(options.progress.clone());
        if let Some(store) = store {
            ports = ports.with_store(store);
        }
        ports
    }
}
