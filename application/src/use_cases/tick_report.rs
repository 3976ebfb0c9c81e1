//! What happened during one tick of an agent.

use bdi_domain::{
    AgentId, BeliefId, CyclePhase, DesireId, IntentionId, ResolutionOutcome, SelectionOutcome,
    StepId,
};
use serde::Serialize;

/// A phase (or the oracle part of it) that was skipped for the tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedPhase {
    pub phase: CyclePhase,
    pub reason: String,
}

/// Result of advancing a plan by one step, or of handling a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Completed {
        intention_id: IntentionId,
        step_id: StepId,
        action: String,
    },
    /// The step's resources are not available; it stays pending.
    Blocked {
        intention_id: IntentionId,
        step_id: StepId,
        resource: String,
    },
    /// The executor returned false.
    Failed {
        intention_id: IntentionId,
        step_id: StepId,
        action: String,
    },
    /// The failed plan got new steps.
    Replanned {
        intention_id: IntentionId,
        steps: usize,
        attempt: u32,
    },
    /// The replan could not be obtained this tick; retried next tick.
    ReplanDeferred {
        intention_id: IntentionId,
        reason: String,
    },
    /// No replacement plan exists; the intention failed.
    Exhausted { intention_id: IntentionId },
    /// The executor broke; the intention failed.
    ExecutorError {
        intention_id: IntentionId,
        step_id: StepId,
        error: String,
    },
    PlanCompleted { intention_id: IntentionId },
    /// A REQUEST from another agent was executed.
    RequestHandled {
        requester: AgentId,
        action: String,
        success: bool,
    },
}

impl StepOutcome {
    pub fn intention_id(&self) -> Option<&IntentionId> {
        match self {
            StepOutcome::Completed { intention_id, .. }
            | StepOutcome::Blocked { intention_id, .. }
            | StepOutcome::Failed { intention_id, .. }
            | StepOutcome::Replanned { intention_id, .. }
            | StepOutcome::ReplanDeferred { intention_id, .. }
            | StepOutcome::Exhausted { intention_id }
            | StepOutcome::ExecutorError { intention_id, .. }
            | StepOutcome::PlanCompleted { intention_id } => Some(intention_id),
            StepOutcome::RequestHandled { .. } => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepOutcome::Completed { .. } => "completed",
            StepOutcome::Blocked { .. } => "blocked",
            StepOutcome::Failed { .. } => "failed",
            StepOutcome::Replanned { .. } => "replanned",
            StepOutcome::ReplanDeferred { .. } => "replan_deferred",
            StepOutcome::Exhausted { .. } => "exhausted",
            StepOutcome::ExecutorError { .. } => "executor_error",
            StepOutcome::PlanCompleted { .. } => "plan_completed",
            StepOutcome::RequestHandled { .. } => "request_handled",
        }
    }
}

/// Per-tick summary returned by [`CognitiveCycle::tick`].
///
/// [`CognitiveCycle::tick`]: crate::use_cases::cognitive_cycle::CognitiveCycle::tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub agent_id: AgentId,
    pub tick: u64,
    pub messages_received: usize,
    pub percepts: usize,
    pub beliefs_inserted: usize,
    pub beliefs_superseded: usize,
    pub beliefs_inferred: usize,
    pub inconsistencies: usize,
    pub resolutions: Vec<ResolutionOutcome>,
    pub flagged: Vec<BeliefId>,
    pub desires_added: usize,
    pub desires_adopted: Vec<DesireId>,
    pub selection: SelectionOutcome,
    pub plans_created: Vec<IntentionId>,
    pub steps: Vec<StepOutcome>,
    pub intentions_completed: Vec<IntentionId>,
    pub intentions_failed: Vec<IntentionId>,
    pub desires_satisfied: Vec<DesireId>,
    pub desires_suspended: Vec<DesireId>,
    pub skipped_phases: Vec<SkippedPhase>,
    pub messages_sent: usize,
    /// Errors recorded instead of propagated (send failures, persistence).
    pub errors: Vec<String>,
}

impl TickReport {
    pub fn new(agent_id: AgentId, tick: u64) -> Self {
        Self {
            agent_id,
            tick,
            ..Default::default()
        }
    }

    pub fn skip(&mut self, phase: CyclePhase, reason: impl Into<String>) {
        self.skipped_phases.push(SkippedPhase {
            phase,
            reason: reason.into(),
        });
    }

    pub fn was_skipped(&self, phase: CyclePhase) -> bool {
        self.skipped_phases.iter().any(|s| s.phase == phase)
    }

    /// True when the tick changed nothing observable.
    pub fn is_idle(&self) -> bool {
        self.messages_received == 0
            && self.percepts == 0
            && self.beliefs_inserted == 0
            && self.beliefs_superseded == 0
            && self.selection.is_empty()
            && self.steps.is_empty()
            && self.messages_sent == 0
    }
}
