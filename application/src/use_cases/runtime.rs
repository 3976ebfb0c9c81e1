//! Agent runtime use case
//!
//! Drives a [`CognitiveCycle`] on a fixed cadence until a tick limit is hit
//! or the cancellation token fires, and runs a whole society of agents as
//! concurrent tasks.

use crate::use_cases::cognitive_cycle::CognitiveCycle;
use crate::use_cases::tick_report::TickReport;
use bdi_domain::{AgentId, AgentSnapshot};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Reports kept per agent unless configured otherwise.
pub const DEFAULT_REPORT_WINDOW: usize = 32;

/// Running counts over every tick of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub steps_executed: usize,
    pub messages_sent: usize,
    pub intentions_completed: usize,
    pub intentions_failed: usize,
    pub errors: usize,
}

impl RunTotals {
    pub fn record(&mut self, report: &TickReport) {
        self.steps_executed += report.steps.len();
        self.messages_sent += report.messages_sent;
        self.intentions_completed += report.intentions_completed.len();
        self.intentions_failed += report.intentions_failed.len();
        self.errors += report.errors.len();
    }
}

/// What an agent did over a run.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeSummary {
    pub agent_id: AgentId,
    pub ticks: u64,
    pub totals: RunTotals,
    /// The most recent tick reports, oldest first.
    pub recent: Vec<TickReport>,
    pub final_state: AgentSnapshot,
}

impl RuntimeSummary {
    pub fn steps_executed(&self) -> usize {
        self.totals.steps_executed
    }

    pub fn messages_sent(&self) -> usize {
        self.totals.messages_sent
    }

    pub fn intentions_completed(&self) -> usize {
        self.totals.intentions_completed
    }
}

pub struct AgentRuntime {
    cycle: CognitiveCycle,
    interval: Duration,
    max_ticks: Option<u64>,
    report_window: usize,
    cancellation_token: CancellationToken,
}

impl AgentRuntime {
    /// Tick at the agent's configured interval, forever unless limited.
    pub fn new(cycle: CognitiveCycle) -> Self {
        let interval = cycle.config().tick_interval;
        Self {
            cycle,
            interval,
            max_ticks: None,
            report_window: DEFAULT_REPORT_WINDOW,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Number of recent tick reports kept for the summary.
    pub fn with_report_window(mut self, reports: usize) -> Self {
        self.report_window = reports;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn agent_id(&self) -> &AgentId {
        self.cycle.agent_id()
    }

    pub fn cycle(&self) -> &CognitiveCycle {
        &self.cycle
    }

    pub fn cycle_mut(&mut self) -> &mut CognitiveCycle {
        &mut self.cycle
    }

    /// Tick until the limit or cancellation. A tick in progress always
    /// finishes; cancellation is observed between ticks.
    pub async fn run(mut self) -> RuntimeSummary {
        let mut totals = RunTotals::default();
        let mut recent = VecDeque::with_capacity(self.report_window);
        let mut ticks = 0u64;
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => {
                    info!("{} cancelled after {} ticks", self.cycle.agent_id(), ticks);
                    break;
                }
                _ = interval.tick() => {}
            }
            let report = self.cycle.tick().await;
            totals.record(&report);
            if self.report_window > 0 {
                if recent.len() == self.report_window {
                    recent.pop_front();
                }
                recent.push_back(report);
            }
            ticks += 1;
        }

        self.cycle
            .ports()
            .progress
            .on_agent_finished(self.cycle.agent_id(), ticks);

        RuntimeSummary {
            agent_id: self.cycle.agent_id().clone(),
            ticks,
            totals,
            recent: recent.into(),
            final_state: self.cycle.snapshot().await,
        }
    }
}

/// Run every agent as its own task and collect their summaries, ordered by
/// agent id.
pub async fn run_society(runtimes: Vec<AgentRuntime>) -> Vec<RuntimeSummary> {
    let mut join_set = JoinSet::new();
    for runtime in runtimes {
        join_set.spawn(runtime.run());
    }

    let mut summaries = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(e) => warn!("Agent task join error: {}", e),
        }
    }
    summaries.sort_by(|a, b| a.agent_id.cmp(&b.agent_id));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::cognitive_cycle::AgentPorts;
    use crate::use_cases::message_bus::MessageBus;
    use bdi_domain::{AgentProfile, BeliefKey, Percept, Performative};
    use serde_json::json;
    use std::sync::Arc;

    fn agent(bus: &Arc<MessageBus>, id: &str, profile: AgentProfile) -> CognitiveCycle {
        CognitiveCycle::new(id.into(), profile, bus.clone(), AgentPorts::default()).unwrap()
    }

    #[tokio::test]
    async fn test_runs_requested_ticks() {
        let bus = Arc::new(MessageBus::new());
        let cycle = agent(&bus, "a", AgentProfile::new("idle"));
        cycle.perceive(Percept::new(BeliefKey::named("temp"), 20));

        let summary = AgentRuntime::new(cycle)
            .with_interval(Duration::from_millis(1))
            .with_max_ticks(3)
            .run()
            .await;

        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.recent.len(), 3);
        assert_eq!(summary.recent[0].percepts, 1);
        assert_eq!(summary.final_state.tick, 3);
    }

    #[tokio::test]
    async fn test_report_window_bounds_history_but_totals_count_all() {
        let bus = Arc::new(MessageBus::new());
        let asker = agent(&bus, "asker", AgentProfile::new("client"));
        let worker = agent(&bus, "worker", AgentProfile::new("worker").with_capability("charge"));
        for _ in 0..3 {
            asker
                .tell("worker".into(), Performative::Request, json!("charge"))
                .unwrap();
        }

        let summary = AgentRuntime::new(worker)
            .with_interval(Duration::from_millis(1))
            .with_max_ticks(10)
            .with_report_window(4)
            .run()
            .await;

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.recent.len(), 4);
        assert_eq!(summary.recent[0].tick, 7);
        assert_eq!(summary.recent[3].tick, 10);
        // everything happened in the first tick, outside the window
        assert_eq!(summary.messages_sent(), 3);
        assert_eq!(summary.steps_executed(), 3);
        assert!(summary.recent.iter().all(|r| r.messages_sent == 0));
    }

    #[tokio::test]
    async fn test_cancellation_stops_runtime() {
        let bus = Arc::new(MessageBus::new());
        let token = CancellationToken::new();
        token.cancel();

        let summary = AgentRuntime::new(agent(&bus, "a", AgentProfile::new("idle")))
            .with_interval(Duration::from_millis(1))
            .with_cancellation(token)
            .run()
            .await;

        assert_eq!(summary.ticks, 0);
    }

    #[tokio::test]
    async fn test_society_exchanges_messages() {
        let bus = Arc::new(MessageBus::new());
        let asker = agent(&bus, "asker", AgentProfile::new("client"));
        let worker = agent(&bus, "worker", AgentProfile::new("worker").with_capability("charge"));

        asker
            .tell("worker".into(), Performative::Request, json!("charge"))
            .unwrap();
        asker
            .tell("worker".into(), Performative::Request, json!("status"))
            .unwrap();

        let runtimes = vec![
            AgentRuntime::new(worker).with_interval(Duration::from_millis(1)).with_max_ticks(3),
            AgentRuntime::new(asker).with_interval(Duration::from_millis(1)).with_max_ticks(3),
        ];
        let summaries = run_society(runtimes).await;

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].agent_id, AgentId::new("asker"));
        assert_eq!(summaries[1].messages_sent(), 2);
        assert!(summaries[1].final_state.beliefs.named_value("inbox:asker").is_some());
    }
}
