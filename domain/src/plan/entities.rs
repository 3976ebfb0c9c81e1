//! Plan entities

use crate::belief::entities::Belief;
use crate::core::error::DomainError;
use crate::core::ids::{DesireId, IntentionId, PlanId, StepId};
use crate::resource::ResourceMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
    /// Execution returned false; the plan is waiting for a replan.
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

/// One unit of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: StepId,
    /// Vocabulary verb passed to the action executor.
    pub action: String,
    pub description: String,
    #[serde(default)]
    pub status: StepStatus,
    /// Sub-goal this step serves, if any.
    #[serde(default)]
    pub goal_id: Option<DesireId>,
    /// Reserved from the agent's pool while the step executes.
    #[serde(default)]
    pub resources: ResourceMap,
}

impl PlanStep {
    pub fn new(action: impl Into<String>) -> Self {
        let action = action.into();
        Self {
            id: StepId::generate(),
            description: action.clone(),
            action,
            status: StepStatus::Pending,
            goal_id: None,
            resources: ResourceMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<StepId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_goal(mut self, goal_id: impl Into<DesireId>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.resources.insert(name.into(), amount);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// Alternative encodings of a plan kept alongside its steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRepresentations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbolic: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Value>,
}

/// Steps proposed by a planning oracle, not yet bound to an intention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDraft {
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub representations: PlanRepresentations,
}

impl PlanDraft {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self {
            steps,
            representations: PlanRepresentations::default(),
        }
    }

    /// Shorthand for a draft of plain actions.
    pub fn from_actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(actions.into_iter().map(PlanStep::new).collect())
    }
}

/// What a planning oracle is asked to plan for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningGoal {
    pub intention_id: IntentionId,
    pub desire_id: DesireId,
    pub description: String,
    #[serde(default)]
    pub resources: ResourceMap,
}

/// Context handed to a planning oracle when a plan needs replacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplanContext {
    /// Desire the failed plan was pursuing.
    pub desire_id: DesireId,
    pub failed_step: Option<StepId>,
    /// Replans already applied to this plan.
    pub attempt: u32,
    pub beliefs: Vec<Belief>,
}

/// An ordered action sequence toward an intention's goal.
///
/// Completion is derived: a plan is completed exactly when all its steps
/// are. Steps complete in order, and a completed plan accepts no further
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    id: PlanId,
    intention_id: IntentionId,
    goal: String,
    steps: Vec<PlanStep>,
    #[serde(default)]
    representations: PlanRepresentations,
    #[serde(default)]
    replans: u32,
    #[serde(default)]
    failed: bool,
}

impl Plan {
    pub fn new(intention_id: IntentionId, goal: impl Into<String>, draft: PlanDraft) -> Self {
        Self {
            id: PlanId::generate(),
            intention_id,
            goal: goal.into(),
            steps: draft.steps,
            representations: draft.representations,
            replans: 0,
            failed: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<PlanId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &PlanId {
        &self.id
    }

    pub fn intention_id(&self) -> &IntentionId {
        &self.intention_id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn representations(&self) -> &PlanRepresentations {
        &self.representations
    }

    pub fn replans(&self) -> u32 {
        self.replans
    }

    pub fn step(&self, id: &StepId) -> Option<&PlanStep> {
        self.steps.iter().find(|s| &s.id == id)
    }

    pub fn is_completed(&self) -> bool {
        self.steps.iter().all(PlanStep::is_completed)
    }

    /// Abandoned after replanning was exhausted.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// First step whose completion flag is false.
    pub fn get_next_step(&self) -> Option<&PlanStep> {
        self.steps.iter().find(|s| !s.is_completed())
    }

    /// First failed step, i.e. the one a pending replan is about.
    pub fn failed_step(&self) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn needs_replan(&self) -> bool {
        !self.failed && self.failed_step().is_some()
    }

    /// (completed, total)
    pub fn progress(&self) -> (usize, usize) {
        let completed = self.steps.iter().filter(|s| s.is_completed()).count();
        (completed, self.steps.len())
    }

    pub fn remaining_steps(&self) -> usize {
        let (completed, total) = self.progress();
        total - completed
    }

    pub fn completion_fraction(&self) -> f64 {
        let (completed, total) = self.progress();
        if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        }
    }

    /// Mark a step completed (or back to pending).
    pub fn update_step_status(&mut self, step_id: &StepId, completed: bool) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let index = self.index_of(step_id)?;
        if completed {
            if let Some(blocking) = self.steps[..index].iter().find(|s| !s.is_completed()) {
                return Err(DomainError::StepOutOfOrder {
                    step: step_id.clone(),
                    blocking: blocking.id.clone(),
                });
            }
            self.steps[index].status = StepStatus::Completed;
        } else {
            self.steps[index].status = StepStatus::Pending;
        }
        Ok(())
    }

    pub fn mark_step_failed(&mut self, step_id: &StepId) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        let index = self.index_of(step_id)?;
        self.steps[index].status = StepStatus::Failed;
        Ok(())
    }

    /// Swap in the steps of a replan.
    ///
    /// The plan keeps its id and intention; completion is re-derived from
    /// the new steps.
    pub fn replace_steps(&mut self, draft: PlanDraft) -> Result<(), DomainError> {
        self.ensure_mutable()?;
        self.steps = draft.steps;
        self.representations = draft.representations;
        self.replans += 1;
        self.failed = false;
        Ok(())
    }

    /// Scheduling score; higher runs first.
    ///
    /// `100 + urgency * 10 + max(10 - remaining, 0)`, plus
    /// `completion_fraction * 20` while the plan is in progress.
    pub fn priority_score(&self, urgency: f64) -> f64 {
        let remaining = self.remaining_steps() as f64;
        let mut score = 100.0 + urgency * 10.0 + (10.0 - remaining).max(0.0);
        if !self.is_completed() {
            score += self.completion_fraction() * 20.0;
        }
        score
    }

    fn ensure_mutable(&self) -> Result<(), DomainError> {
        if self.is_completed() {
            Err(DomainError::PlanCompleted(self.id.clone()))
        } else {
            Ok(())
        }
    }

    fn index_of(&self, step_id: &StepId) -> Result<usize, DomainError> {
        self.steps
            .iter()
            .position(|s| &s.id == step_id)
            .ok_or_else(|| DomainError::UnknownStep(step_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_steps() -> Plan {
        Plan::new(
            "int-1".into(),
            "clean room",
            PlanDraft::new(vec![
                PlanStep::new("move").with_id("s1"),
                PlanStep::new("vacuum").with_id("s2"),
                PlanStep::new("report").with_id("s3"),
            ]),
        )
    }

    #[test]
    fn test_steps_complete_in_order() {
        let mut plan = three_steps();
        assert_eq!(plan.get_next_step().unwrap().id.as_str(), "s1");

        let err = plan.update_step_status(&"s2".into(), true).unwrap_err();
        assert_eq!(
            err,
            DomainError::StepOutOfOrder {
                step: "s2".into(),
                blocking: "s1".into()
            }
        );

        plan.update_step_status(&"s1".into(), true).unwrap();
        plan.update_step_status(&"s2".into(), true).unwrap();
        assert!(!plan.is_completed());
        assert_eq!(plan.get_next_step().unwrap().id.as_str(), "s3");

        plan.update_step_status(&"s3".into(), true).unwrap();
        assert!(plan.is_completed());
        assert!(plan.get_next_step().is_none());
    }

    #[test]
    fn test_unknown_step_rejected() {
        let mut plan = three_steps();
        assert_eq!(
            plan.update_step_status(&"nope".into(), true),
            Err(DomainError::UnknownStep("nope".into()))
        );
    }

    #[test]
    fn test_completed_plan_is_frozen() {
        let mut plan = Plan::new(
            "int-1".into(),
            "wave",
            PlanDraft::new(vec![PlanStep::new("wave").with_id("s1")]),
        )
        .with_id("p1");
        plan.update_step_status(&"s1".into(), true).unwrap();

        assert_eq!(
            plan.update_step_status(&"s1".into(), false),
            Err(DomainError::PlanCompleted("p1".into()))
        );
        assert_eq!(
            plan.replace_steps(PlanDraft::from_actions(["again"])),
            Err(DomainError::PlanCompleted("p1".into()))
        );
    }

    #[test]
    fn test_replace_steps_keeps_identity() {
        let mut plan = three_steps().with_id("p1");
        plan.update_step_status(&"s1".into(), true).unwrap();
        plan.mark_step_failed(&"s2".into()).unwrap();
        assert!(plan.needs_replan());

        plan.replace_steps(PlanDraft::new(vec![
            PlanStep::new("mop").with_id("n1"),
            PlanStep::new("report").with_id("n2"),
        ]))
        .unwrap();

        assert_eq!(plan.id().as_str(), "p1");
        assert_eq!(plan.intention_id().as_str(), "int-1");
        assert_eq!(plan.steps().len(), 2);
        assert_eq!(plan.replans(), 1);
        assert!(!plan.is_completed());
        assert!(!plan.needs_replan());
        assert_eq!(plan.get_next_step().unwrap().id.as_str(), "n1");
    }

    #[test]
    fn test_priority_score() {
        let mut plan = three_steps();
        // 100 + 2*10 + (10 - 3) + 0
        assert_eq!(plan.priority_score(2.0), 127.0);

        plan.update_step_status(&"s1".into(), true).unwrap();
        // 100 + 0 + (10 - 2) + (1/3)*20
        let expected = 108.0 + 20.0 / 3.0;
        assert!((plan.priority_score(0.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_plan_round_trips() {
        let plan = three_steps();
        let json = serde_json::to_string(&plan).unwrap();
        let back: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plan);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Complete(usize),
            Reset(usize),
            Fail(usize),
            Replace(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0usize..6).prop_map(Op::Complete),
                (0usize..6).prop_map(Op::Reset),
                (0usize..6).prop_map(Op::Fail),
                (0usize..5).prop_map(Op::Replace),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_completion_matches_steps(ops in prop::collection::vec(op(), 0..30)) {
                let mut plan = three_steps();
                for op in ops {
                    let ids: Vec<StepId> = plan.steps().iter().map(|s| s.id.clone()).collect();
                    let pick = |i: usize| ids.get(i % ids.len().max(1)).cloned();
                    let _ = match op {
                        Op::Complete(i) => pick(i).map(|id| plan.update_step_status(&id, true)),
                        Op::Reset(i) => pick(i).map(|id| plan.update_step_status(&id, false)),
                        Op::Fail(i) => pick(i).map(|id| plan.mark_step_failed(&id)),
                        Op::Replace(n) => Some(plan.replace_steps(PlanDraft::from_actions(
                            (0..n).map(|k| format!("a{k}")),
                        ))),
                    };

                    let all_done = plan.steps().iter().all(|s| s.is_completed());
                    prop_assert_eq!(plan.is_completed(), all_done);
                    prop_assert_eq!(plan.get_next_step().is_none(), all_done);
                    prop_assert_eq!(plan.intention_id().as_str(), "int-1");
                }
            }
        }
    }
}
