//! Cognitive cycle use case
//!
//! Runs one agent's perceive → revise → generate desires → select
//! intentions → plan → execute → emit loop, one tick at a time.
//!
//! A tick never fails. Oracle errors skip the affected phase, executor
//! errors fail the affected intention, and send or persistence errors are
//! recorded in the [`TickReport`].

use crate::config::CycleConfig;
use crate::ports::action_executor::{ActionExecutor, NoopExecutor};
use crate::ports::agent_store::{AgentStore, StoreError};
use crate::ports::cycle_logger::{CycleEvent, CycleLogger, NoCycleLogger};
use crate::ports::cycle_progress::{CycleProgressNotifier, NoCycleProgress};
use crate::ports::planning_oracle::{NoPlanning, PlanningOracle};
use crate::ports::reasoning_oracle::{NoReasoning, ReasoningOracle};
use crate::use_cases::dispatch::{PendingRequest, PerformativeDispatcher};
use crate::use_cases::message_bus::{CommunicationError, Mailbox, MessageBus};
use crate::use_cases::plan_engine::{PlanEngine, PlanEngineLimits, bounded};
use crate::use_cases::tick_report::{StepOutcome, TickReport};
use bdi_domain::desire::evaluate_templates;
use bdi_domain::{
    AgentId, AgentProfile, AgentSnapshot, Belief, BeliefStore, CyclePhase, DesireSet,
    IntentionSet, IntentionStatus, Message, MessageId, NoOntology, Ontology, Percept,
    Performative, PlanStep, ResolutionOutcome, ResolverRegistry, ResourcePool, RevisionOutcome,
    select_intentions,
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Communication error: {0}")]
    Communication(#[from] CommunicationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Collaborators injected into an agent.
#[derive(Clone)]
pub struct AgentPorts {
    pub reasoning: Arc<dyn ReasoningOracle>,
    pub planning: Arc<dyn PlanningOracle>,
    pub executor: Arc<dyn ActionExecutor>,
    pub store: Option<Arc<dyn AgentStore>>,
    pub logger: Arc<dyn CycleLogger>,
    pub progress: Arc<dyn CycleProgressNotifier>,
}

impl Default for AgentPorts {
    fn default() -> Self {
        Self {
            reasoning: Arc::new(NoReasoning),
            planning: Arc::new(NoPlanning),
            executor: Arc::new(NoopExecutor),
            store: None,
            logger: Arc::new(NoCycleLogger),
            progress: Arc::new(NoCycleProgress),
        }
    }
}

impl AgentPorts {
    pub fn with_reasoning(mut self, reasoning: Arc<dyn ReasoningOracle>) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_planning(mut self, planning: Arc<dyn PlanningOracle>) -> Self {
        self.planning = planning;
        self
    }

    pub fn with_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn AgentStore>) -> Self {
        self.store = Some(store);
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
}

/// One BDI agent: its mental state, its mailbox, and its ports.
pub struct CognitiveCycle {
    agent_id: AgentId,
    profile: AgentProfile,
    config: CycleConfig,
    ontology: Arc<dyn Ontology>,
    resolvers: ResolverRegistry,
    beliefs: BeliefStore,
    desires: DesireSet,
    intentions: IntentionSet,
    resources: Arc<Mutex<ResourcePool>>,
    mailbox: Mailbox,
    bus: Arc<MessageBus>,
    percept_tx: mpsc::UnboundedSender<Percept>,
    percept_rx: mpsc::UnboundedReceiver<Percept>,
    tick: u64,
    ports: AgentPorts,
}

impl CognitiveCycle {
    /// Create an agent and register its mailbox on `bus`.
    pub fn new(
        agent_id: AgentId,
        profile: AgentProfile,
        bus: Arc<MessageBus>,
        ports: AgentPorts,
    ) -> Result<Self, CycleError> {
        let mailbox = bus.register(agent_id.clone())?;
        let (percept_tx, percept_rx) = mpsc::unbounded_channel();
        Ok(Self {
            agent_id,
            profile,
            config: CycleConfig::default(),
            ontology: Arc::new(NoOntology),
            resolvers: ResolverRegistry::default(),
            beliefs: BeliefStore::new(),
            desires: DesireSet::new(),
            intentions: IntentionSet::new(),
            resources: Arc::new(Mutex::new(ResourcePool::new())),
            mailbox,
            bus,
            percept_tx,
            percept_rx,
            tick: 0,
            ports,
        })
    }

    pub fn with_config(mut self, config: CycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ontology(mut self, ontology: Arc<dyn Ontology>) -> Self {
        self.ontology = ontology;
        self
    }

    pub fn with_resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    pub fn with_resources(mut self, resources: ResourcePool) -> Self {
        self.resources = Arc::new(Mutex::new(resources));
        self
    }

    pub fn with_beliefs(mut self, beliefs: impl IntoIterator<Item = Belief>) -> Self {
        for belief in beliefs {
            self.beliefs.revise(belief);
        }
        self
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn beliefs(&self) -> &BeliefStore {
        &self.beliefs
    }

    pub fn desires(&self) -> &DesireSet {
        &self.desires
    }

    pub fn intentions(&self) -> &IntentionSet {
        &self.intentions
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn ports(&self) -> &AgentPorts {
        &self.ports
    }

    pub async fn resources(&self) -> ResourcePool {
        self.resources.lock().await.clone()
    }

    /// Sender for environment percepts; they are picked up by the next
    /// perceive phase in send order.
    pub fn percept_sender(&self) -> mpsc::UnboundedSender<Percept> {
        self.percept_tx.clone()
    }

    pub fn perceive(&self, percept: Percept) {
        // the receiver lives in self, so the channel is open
        let _ = self.percept_tx.send(percept);
    }

    pub fn subscribe(&self, topic: &str) -> Result<(), CommunicationError> {
        self.bus.subscribe(&self.agent_id, topic)
    }

    /// Send a message from this agent right away, outside the tick.
    pub fn tell(
        &self,
        receiver: AgentId,
        performative: Performative,
        content: impl Into<Value>,
    ) -> Result<MessageId, CommunicationError> {
        self.bus
            .tell(self.agent_id.clone(), receiver, performative, content)
    }

    pub fn publish(&self, topic: &str, performative: Performative, content: impl Into<Value>) -> usize {
        self.bus
            .publish(self.agent_id.clone(), topic, performative, content)
    }

    pub async fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            agent_id: self.agent_id.clone(),
            tick: self.tick,
            beliefs: self.beliefs.clone(),
            desires: self.desires.clone(),
            intentions: self.intentions.clone(),
            resources: self.resources.lock().await.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Replace the mental state with a saved one.
    pub async fn restore(&mut self, snapshot: AgentSnapshot) {
        self.tick = snapshot.tick;
        self.beliefs = snapshot.beliefs;
        self.desires = snapshot.desires;
        self.intentions = snapshot.intentions;
        *self.resources.lock().await = snapshot.resources;
    }

    /// Restore from the configured store, if it holds this agent.
    pub async fn resume(&mut self) -> Result<bool, CycleError> {
        let Some(store) = self.ports.store.clone() else {
            return Ok(false);
        };
        match store.load(&self.agent_id).await? {
            Some(snapshot) => {
                info!("Resuming {} from tick {}", self.agent_id, snapshot.tick);
                self.restore(snapshot).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run one full cycle.
    pub async fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport::new(self.agent_id.clone(), self.tick);
        let progress = self.ports.progress.clone();
        progress.on_tick_start(&self.agent_id, self.tick);
        self.log("tick_started", json!({}));
        debug!("{} tick {}", self.agent_id, self.tick);

        // ==================== Perceive ====================
        let messages = self.mailbox.drain();
        let mut percepts = Vec::new();
        while let Ok(percept) = self.percept_rx.try_recv() {
            percepts.push(percept);
        }
        report.messages_received = messages.len();
        report.percepts = percepts.len();
        self.phase_done(CyclePhase::Perceive);

        // ==================== Revise ====================
        let mut outbox: Vec<Message> = Vec::new();
        let mut requests: Vec<PendingRequest> = Vec::new();

        // own changes this tick, shared with publish topics in emit
        let mut changed: Vec<Belief> = Vec::new();

        // strictly increasing stamps keep arrival order for last-writer-wins
        let observed_at = Utc::now();
        for (offset, percept) in (0_i64..).zip(percepts) {
            let stamp = observed_at + chrono::Duration::nanoseconds(offset);
            self.revise_own(percept.into_belief(stamp), &mut report, &mut changed);
        }

        let pool = self.resources.lock().await.clone();
        let dispatcher = PerformativeDispatcher::new(&self.agent_id, &self.profile, &self.config);
        for message in &messages {
            let dispatched =
                dispatcher.dispatch(message, &mut self.beliefs, &mut self.desires, &pool);
            for outcome in &dispatched.revisions {
                count_revision(&mut report, outcome);
            }
            outbox.extend(dispatched.reply);
            requests.extend(dispatched.request);
            report.desires_adopted.extend(dispatched.adopted);
        }

        let active: Vec<Belief> = self.beliefs.active().cloned().collect();
        match bounded(self.config.oracle_timeout, self.ports.reasoning.infer(&active)).await {
            Ok(inferred) => {
                report.beliefs_inferred = inferred.len();
                for belief in inferred {
                    self.revise_own(belief, &mut report, &mut changed);
                }
            }
            Err(e) => {
                warn!("{}: inference skipped: {}", self.agent_id, e);
                self.skip(&mut report, CyclePhase::Revise, format!("inference: {}", e));
            }
        }

        let records = self.beliefs.check_consistency(self.ontology.as_ref());
        report.inconsistencies = records.len();
        let resolution = self
            .beliefs
            .resolve(&records, self.ontology.as_ref(), &self.resolvers);
        for outcome in &resolution.outcomes {
            match outcome {
                ResolutionOutcome::Unresolved { kind, flagged } => {
                    for id in flagged {
                        self.log("belief_flagged", json!({ "belief_id": id, "kind": kind }));
                    }
                    report.flagged.extend(flagged.iter().cloned());
                }
                ResolutionOutcome::Skipped { kind } => {
                    warn!("{}: no resolver for {} inconsistency", self.agent_id, kind);
                }
                ResolutionOutcome::Failed { kind, error } => {
                    warn!("{}: resolving {} failed: {:?}", self.agent_id, kind, error);
                }
                ResolutionOutcome::Resolved { .. } => {}
            }
        }
        report.resolutions = resolution.outcomes;
        self.phase_done(CyclePhase::Revise);

        // Everything below sees this snapshot only
        let snapshot: Vec<Belief> = self.beliefs.active().cloned().collect();

        // ==================== Generate desires ====================
        let threshold = self.config.precondition_threshold();
        let mut generated = evaluate_templates(&self.profile.desire_templates, &snapshot, threshold);
        match bounded(
            self.config.oracle_timeout,
            self.ports.reasoning.generate_desires(&snapshot),
        )
        .await
        {
            Ok(desires) => generated.extend(desires),
            Err(e) => {
                warn!("{}: desire generation skipped: {}", self.agent_id, e);
                self.skip(&mut report, CyclePhase::GenerateDesires, e.to_string());
            }
        }
        report.desires_added = self.desires.merge(generated);
        self.phase_done(CyclePhase::GenerateDesires);

        // ==================== Select intentions ====================
        let pool = self.resources.lock().await.clone();
        match select_intentions(
            &mut self.intentions,
            &self.desires,
            &snapshot,
            &pool,
            &self.config.selection_policy(),
        ) {
            Ok(selection) => {
                for id in &selection.committed {
                    self.log("intention_committed", json!({ "intention_id": id }));
                }
                for dropped in &selection.dropped {
                    self.log("intention_dropped", serde_json::to_value(dropped).unwrap_or_default());
                }
                report.selection = selection;
            }
            Err(e) => {
                warn!("{}: selection failed: {}", self.agent_id, e);
                report.errors.push(e.to_string());
            }
        }
        self.phase_done(CyclePhase::SelectIntentions);

        // ==================== Plan ====================
        let engine = self.plan_engine();
        let (planned, error) = engine.ensure_plans(&mut self.intentions, &snapshot).await;
        report.plans_created = planned.created;
        report.steps.extend(planned.steps);
        match error {
            Some(e) => {
                warn!("{}: planning skipped: {}", self.agent_id, e);
                self.skip(&mut report, CyclePhase::Plan, e.to_string());
            }
            None => self.phase_done(CyclePhase::Plan),
        }

        // ==================== Execute ====================
        let steps = engine
            .execute(&mut self.intentions, &self.resources, &snapshot)
            .await;
        let mut outcome_beliefs: Vec<Belief> = steps
            .iter()
            .filter_map(|step| self.outcome_belief(step))
            .collect();
        report.steps.extend(steps);

        for pending in requests {
            let (reply, outcome) = self.handle_request(&engine, pending).await;
            if let Some(belief) = self.outcome_belief(&outcome) {
                outcome_beliefs.push(belief);
            }
            outbox.push(reply);
            report.steps.push(outcome);
        }
        self.phase_done(CyclePhase::Execute);

        // ==================== Emit ====================
        for belief in outcome_beliefs {
            let outcome = self.beliefs.revise(belief);
            count_revision(&mut report, &outcome);
        }

        for intention in self.intentions.drain_terminal() {
            match intention.status {
                IntentionStatus::Completed => {
                    let effects = self
                        .desires
                        .get(&intention.desire_id)
                        .map(|d| d.effects.clone())
                        .unwrap_or_default();
                    for effect in effects {
                        let belief = effect.to_belief(self.agent_id.as_str());
                        self.revise_own(belief, &mut report, &mut changed);
                    }
                    if self.desires.mark_satisfied(&intention.desire_id) {
                        report.desires_satisfied.push(intention.desire_id.clone());
                    }
                    report.intentions_completed.push(intention.id);
                }
                _ => {
                    if self
                        .desires
                        .record_failure(&intention.desire_id, self.config.max_intention_failures)
                    {
                        info!(
                            "{}: desire {} suspended after repeated failures",
                            self.agent_id, intention.desire_id
                        );
                        report.desires_suspended.push(intention.desire_id.clone());
                    }
                    report.intentions_failed.push(intention.id);
                }
            }
        }
        self.desires.remove_satisfied();

        for message in outbox {
            let payload = json!({
                "message_id": message.id(),
                "receiver": message.receiver(),
                "performative": message.performative(),
            });
            match self.bus.send(message) {
                Ok(()) => {
                    report.messages_sent += 1;
                    self.log("message_sent", payload);
                }
                Err(e) => {
                    warn!("{}: send failed: {}", self.agent_id, e);
                    report.errors.push(e.to_string());
                }
            }
        }

        self.publish_changes(&mut report, changed);

        if let Some(store) = self.ports.store.clone() {
            let snapshot = self.snapshot().await;
            if let Err(e) = store.save(&snapshot).await {
                warn!("{}: snapshot not saved: {}", self.agent_id, e);
                report.errors.push(format!("persistence: {}", e));
            }
        }

        for step in &report.steps {
            self.log("step_executed", serde_json::to_value(step).unwrap_or_default());
        }
        self.log(
            "tick_completed",
            json!({
                "steps": report.steps.len(),
                "messages_sent": report.messages_sent,
                "skipped_phases": report.skipped_phases,
            }),
        );
        self.phase_done(CyclePhase::Emit);
        progress.on_tick_complete(&self.agent_id, &report);

        report
    }

    async fn handle_request(&self, engine: &PlanEngine, pending: PendingRequest) -> (Message, StepOutcome) {
        let PendingRequest { request, action } = pending;
        let step = PlanStep::new(action.as_str())
            .with_description(format!("requested by {}", request.sender()));
        let result = engine.execute_step(&step).await;
        let success = matches!(result, Ok(true));
        let reply = match result {
            Ok(true) => request.reply(
                self.agent_id.clone(),
                Performative::Inform,
                json!({ "action": action, "result": "done" }),
            ),
            Ok(false) => request.reply(
                self.agent_id.clone(),
                Performative::Failure,
                json!({ "action": action, "reason": "action failed" }),
            ),
            Err(e) => request.reply(
                self.agent_id.clone(),
                Performative::Failure,
                json!({ "action": action, "reason": e.to_string() }),
            ),
        };
        let outcome = StepOutcome::RequestHandled {
            requester: request.sender().clone(),
            action,
            success,
        };
        (reply, outcome)
    }

    /// `action:<name>` belief recording how an executed action went.
    fn outcome_belief(&self, step: &StepOutcome) -> Option<Belief> {
        let (action, value) = match step {
            StepOutcome::Completed { action, .. } => (action, "completed"),
            StepOutcome::Failed { action, .. } => (action, "failed"),
            StepOutcome::RequestHandled {
                action, success, ..
            } => (action, if *success { "completed" } else { "failed" }),
            _ => return None,
        };
        Some(Belief::named(format!("action:{}", action), value).with_source(self.agent_id.as_str()))
    }

    /// Revise a belief this agent produced itself, remembering it when the
    /// stored value changed.
    fn revise_own(&mut self, belief: Belief, report: &mut TickReport, changed: &mut Vec<Belief>) {
        let outcome = self.beliefs.revise(belief.clone());
        count_revision(report, &outcome);
        if outcome.changed_value(&belief.value) {
            changed.push(belief);
        }
    }

    /// INFORM every publish topic of the changed beliefs that survived the
    /// tick, with their stored value and certainty.
    fn publish_changes(&self, report: &mut TickReport, changed: Vec<Belief>) {
        if self.profile.publish_topics.is_empty() || changed.is_empty() {
            return;
        }
        let mut shared: Vec<Percept> = Vec::new();
        for belief in changed {
            let Some(current) = self.beliefs.get(&belief.key) else {
                continue;
            };
            if current.is_flagged() || current.value != belief.value {
                continue;
            }
            shared.retain(|p| p.key != current.key);
            shared.push(
                Percept::new(current.key.clone(), current.value.clone())
                    .with_certainty(current.certainty),
            );
        }
        if shared.is_empty() {
            return;
        }

        let count = shared.len();
        let content = json!({ "beliefs": shared });
        for topic in &self.profile.publish_topics {
            let recipients =
                self.bus
                    .publish(self.agent_id.clone(), topic, Performative::Inform, content.clone());
            report.messages_sent += recipients;
            self.log(
                "message_published",
                json!({ "topic": topic, "recipients": recipients, "beliefs": count }),
            );
        }
    }

    fn plan_engine(&self) -> PlanEngine {
        PlanEngine::new(
            self.ports.planning.clone(),
            self.ports.executor.clone(),
            PlanEngineLimits {
                max_steps_per_tick: self.config.max_steps_per_tick,
                max_replans: self.config.max_replans,
                oracle_timeout: self.config.oracle_timeout,
            },
        )
    }

    fn skip(&self, report: &mut TickReport, phase: CyclePhase, reason: String) {
        self.ports
            .progress
            .on_phase_skipped(&self.agent_id, phase, &reason);
        self.log(
            "phase_skipped",
            json!({ "phase": phase.as_str(), "reason": reason }),
        );
        report.skip(phase, reason);
    }

    fn phase_done(&self, phase: CyclePhase) {
        self.ports.progress.on_phase_complete(&self.agent_id, phase);
    }

    fn log(&self, event_type: &'static str, payload: Value) {
        self.ports
            .logger
            .log(CycleEvent::new(event_type, &self.agent_id, self.tick, payload));
    }
}

fn count_revision(report: &mut TickReport, outcome: &RevisionOutcome) {
    match outcome {
        RevisionOutcome::Inserted(_) => report.beliefs_inserted += 1,
        RevisionOutcome::Superseded { .. } => report.beliefs_superseded += 1,
    }
}
