//! Plan engine use case
//!
//! Attaches plans to active intentions and advances them step by step.
//!
//! A step runs only after its resources are reserved from the agent's pool
//! (check and reserve under one lock). A successful step consumes the
//! reservation; a failed one releases it and asks the planning oracle for a
//! replacement. Oracle errors never block the tick: the failed step stays
//! in place and the next tick's plan phase retries.

use crate::ports::action_executor::{ActionError, ActionExecutor};
use crate::ports::planning_oracle::PlanningOracle;
use crate::ports::reasoning_oracle::OracleError;
use crate::use_cases::tick_report::StepOutcome;
use bdi_domain::{
    Belief, DomainError, Intention, IntentionId, IntentionSet, IntentionStatus, Plan, PlanStep,
    PlanningGoal, ReplanContext, ResourcePool,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Limits of the plan engine.
#[derive(Debug, Clone, Copy)]
pub struct PlanEngineLimits {
    pub max_steps_per_tick: usize,
    pub max_replans: u32,
    pub oracle_timeout: Duration,
}

/// Plans created or repaired during a plan phase.
#[derive(Debug, Default)]
pub struct PlanPhaseOutcome {
    pub created: Vec<IntentionId>,
    pub steps: Vec<StepOutcome>,
}

/// Use case for planning and executing intentions
pub struct PlanEngine {
    planner: Arc<dyn PlanningOracle>,
    executor: Arc<dyn ActionExecutor>,
    limits: PlanEngineLimits,
}

impl PlanEngine {
    pub fn new(
        planner: Arc<dyn PlanningOracle>,
        executor: Arc<dyn ActionExecutor>,
        limits: PlanEngineLimits,
    ) -> Self {
        Self {
            planner,
            executor,
            limits,
        }
    }

    pub fn executor(&self) -> &Arc<dyn ActionExecutor> {
        &self.executor
    }

    /// Give every active intention a plan, and retry replans left pending
    /// by an earlier oracle failure.
    ///
    /// Stops at the first oracle error and returns it with what was done so
    /// far; the caller skips the rest of the phase for this tick.
    pub async fn ensure_plans(
        &self,
        intentions: &mut IntentionSet,
        beliefs: &[Belief],
    ) -> (PlanPhaseOutcome, Option<OracleError>) {
        let mut outcome = PlanPhaseOutcome::default();

        for intention in intentions
            .iter_mut()
            .filter(|i| i.status == IntentionStatus::Active)
        {
            match intention.plan.as_ref() {
                None => {
                    let goal = PlanningGoal {
                        intention_id: intention.id.clone(),
                        desire_id: intention.desire_id.clone(),
                        description: intention.goal.clone(),
                        resources: intention.required_resources.clone(),
                    };
                    let result = self
                        .with_timeout(self.planner.generate_plan(&goal, beliefs))
                        .await;
                    match result {
                        Ok(Some(draft)) => {
                            let plan = Plan::new(intention.id.clone(), intention.goal.clone(), draft);
                            info!(
                                "Plan {} with {} steps for intention {}",
                                plan.id(),
                                plan.steps().len(),
                                intention.id
                            );
                            let empty = plan.is_completed();
                            intention.plan = Some(plan);
                            outcome.created.push(intention.id.clone());
                            // nothing left to do: the goal already holds
                            if empty {
                                info!("Intention {} completed", intention.id);
                                intention.status = IntentionStatus::Completed;
                                outcome.steps.push(StepOutcome::PlanCompleted {
                                    intention_id: intention.id.clone(),
                                });
                            }
                        }
                        Ok(None) => {
                            warn!("No plan exists for intention {}", intention.id);
                            intention.fail();
                            outcome.steps.push(StepOutcome::Exhausted {
                                intention_id: intention.id.clone(),
                            });
                        }
                        Err(e) => return (outcome, Some(e)),
                    }
                }
                Some(plan) if plan.needs_replan() => {
                    let failed_step = plan.failed_step().map(|s| s.id.clone());
                    match self.replan(intention, beliefs, failed_step).await {
                        Ok(step) => outcome.steps.push(step),
                        Err(e) => return (outcome, Some(e)),
                    }
                }
                Some(_) => {}
            }
        }

        (outcome, None)
    }

    /// Advance active plans, one step per plan per round, highest
    /// priority score first, until the step budget is spent or no plan can
    /// move.
    pub async fn execute(
        &self,
        intentions: &mut IntentionSet,
        resources: &Mutex<ResourcePool>,
        beliefs: &[Belief],
    ) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();
        let mut budget = self.limits.max_steps_per_tick;
        // plans that stopped moving this tick
        let mut stalled: HashSet<IntentionId> = HashSet::new();

        while budget > 0 {
            let order = schedule(intentions, &stalled);
            if order.is_empty() {
                break;
            }
            for id in order {
                if budget == 0 {
                    break;
                }
                let Some(intention) = intentions.get_mut(&id) else {
                    continue;
                };
                let step_outcomes = self.advance(intention, resources, beliefs).await;
                let progressed = matches!(step_outcomes.first(), Some(StepOutcome::Completed { .. }));
                if !matches!(step_outcomes.first(), Some(StepOutcome::Blocked { .. })) {
                    budget -= 1;
                }
                if !progressed {
                    stalled.insert(id);
                }
                outcomes.extend(step_outcomes);
            }
        }

        outcomes
    }

    /// Run the next step of one intention's plan.
    pub async fn advance(
        &self,
        intention: &mut Intention,
        resources: &Mutex<ResourcePool>,
        beliefs: &[Belief],
    ) -> Vec<StepOutcome> {
        let intention_id = intention.id.clone();
        let Some(step) = intention
            .plan
            .as_ref()
            .and_then(Plan::get_next_step)
            .cloned()
        else {
            return Vec::new();
        };

        let reserved = resources.lock().await.try_reserve(&step.resources);
        if let Err(e) = reserved {
            let resource = match e {
                DomainError::InsufficientResource { resource, .. } => resource,
                other => other.to_string(),
            };
            debug!("Step {} blocked on {}", step.id, resource);
            return vec![StepOutcome::Blocked {
                intention_id,
                step_id: step.id,
                resource,
            }];
        }

        let result = self.execute_step(&step).await;
        let mut outcomes = Vec::new();

        match result {
            Ok(true) => {
                if let Some(plan) = intention.plan.as_mut()
                    && let Err(e) = plan.update_step_status(&step.id, true)
                {
                    warn!("Could not complete step {}: {}", step.id, e);
                }
                outcomes.push(StepOutcome::Completed {
                    intention_id: intention_id.clone(),
                    step_id: step.id.clone(),
                    action: step.action.clone(),
                });
                if intention.plan.as_ref().is_some_and(Plan::is_completed) {
                    info!("Intention {} completed", intention_id);
                    intention.status = IntentionStatus::Completed;
                    outcomes.push(StepOutcome::PlanCompleted { intention_id });
                }
            }
            Ok(false) => {
                resources.lock().await.release(&step.resources);
                if let Some(plan) = intention.plan.as_mut()
                    && let Err(e) = plan.mark_step_failed(&step.id)
                {
                    warn!("Could not mark step {} failed: {}", step.id, e);
                }
                outcomes.push(StepOutcome::Failed {
                    intention_id: intention_id.clone(),
                    step_id: step.id.clone(),
                    action: step.action.clone(),
                });
                match self.replan(intention, beliefs, Some(step.id)).await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        warn!("Replan for {} deferred: {}", intention_id, e);
                        outcomes.push(StepOutcome::ReplanDeferred {
                            intention_id,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Err(e) => {
                resources.lock().await.release(&step.resources);
                warn!("Executor failed on step {}: {}", step.id, e);
                intention.fail();
                outcomes.push(StepOutcome::ExecutorError {
                    intention_id,
                    step_id: step.id,
                    error: e.to_string(),
                });
            }
        }

        outcomes
    }

    /// Invoke the action executor for a single step.
    pub async fn execute_step(&self, step: &PlanStep) -> Result<bool, ActionError> {
        debug!("Executing step {} ({})", step.id, step.action);
        self.executor.execute(step).await
    }

    /// Ask for a replacement of a failed plan.
    ///
    /// `Ok` carries the terminal outcome (replanned or exhausted); `Err`
    /// means the oracle could not be asked and the plan is left as is.
    async fn replan(
        &self,
        intention: &mut Intention,
        beliefs: &[Belief],
        failed_step: Option<bdi_domain::StepId>,
    ) -> Result<StepOutcome, OracleError> {
        let intention_id = intention.id.clone();
        let Some(plan) = intention.plan.as_ref() else {
            return Ok(StepOutcome::Exhausted { intention_id });
        };

        if plan.replans() >= self.limits.max_replans {
            warn!(
                "Intention {} exhausted after {} replans",
                intention_id,
                plan.replans()
            );
            intention.fail();
            return Ok(StepOutcome::Exhausted { intention_id });
        }

        let context = ReplanContext {
            desire_id: intention.desire_id.clone(),
            failed_step,
            attempt: plan.replans(),
            beliefs: beliefs.to_vec(),
        };
        let draft = self
            .with_timeout(self.planner.replan(plan, &context))
            .await?;

        let Some(draft) = draft else {
            info!("No alternative plan for intention {}", intention_id);
            intention.fail();
            return Ok(StepOutcome::Exhausted { intention_id });
        };

        let steps = draft.steps.len();
        let Some(plan) = intention.plan.as_mut() else {
            return Ok(StepOutcome::Exhausted { intention_id });
        };
        if let Err(e) = plan.replace_steps(draft) {
            warn!("Replan rejected for {}: {}", intention_id, e);
            intention.fail();
            return Ok(StepOutcome::Exhausted { intention_id });
        }
        let attempt = plan.replans();
        if plan.is_completed() {
            intention.status = IntentionStatus::Completed;
        }
        info!(
            "Replanned intention {} with {} steps (attempt {})",
            intention_id, steps, attempt
        );
        Ok(StepOutcome::Replanned {
            intention_id,
            steps,
            attempt,
        })
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, OracleError>>,
    ) -> Result<T, OracleError> {
        bounded(self.limits.oracle_timeout, call).await
    }
}

/// Await an oracle call, turning an elapsed `limit` into [`OracleError::Timeout`].
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, OracleError>>,
) -> Result<T, OracleError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout),
    }
}

/// Runnable intentions, highest plan priority score first.
fn schedule(intentions: &IntentionSet, stalled: &HashSet<IntentionId>) -> Vec<IntentionId> {
    let mut runnable: Vec<(&Intention, f64)> = intentions
        .iter()
        .filter(|i| i.status == IntentionStatus::Active && !stalled.contains(&i.id))
        .filter_map(|i| {
            let plan = i.plan.as_ref()?;
            (!plan.is_completed() && !plan.needs_replan() && !plan.is_failed())
                .then(|| (i, plan.priority_score(i.urgency)))
        })
        .collect();
    runnable.sort_by(|(a, sa), (b, sb)| {
        sb.total_cmp(sa)
            .then_with(|| b.priority.total_cmp(&a.priority))
            .then_with(|| a.id.cmp(&b.id))
    });
    runnable.into_iter().map(|(i, _)| i.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bdi_domain::{Desire, PlanDraft};
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ==================== Test Mocks ====================

    /// Planner with scripted answers for generate_plan and replan.
    struct ScriptedPlanner {
        plans: StdMutex<VecDeque<Result<Option<PlanDraft>, OracleError>>>,
        replans: StdMutex<VecDeque<Result<Option<PlanDraft>, OracleError>>>,
        replan_calls: StdMutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedPlanner {
        fn new() -> Self {
            Self {
                plans: StdMutex::new(VecDeque::new()),
                replans: StdMutex::new(VecDeque::new()),
                replan_calls: StdMutex::new(Vec::new()),
            }
        }

        fn with_plan(self, answer: Result<Option<PlanDraft>, OracleError>) -> Self {
            self.plans.lock().unwrap().push_back(answer);
            self
        }

        fn with_replan(self, answer: Result<Option<PlanDraft>, OracleError>) -> Self {
            self.replans.lock().unwrap().push_back(answer);
            self
        }
    }

    #[async_trait]
    impl PlanningOracle for ScriptedPlanner {
        async fn generate_plan(
            &self,
            _goal: &PlanningGoal,
            _beliefs: &[Belief],
        ) -> Result<Option<PlanDraft>, OracleError> {
            self.plans.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }

        async fn replan(
            &self,
            failed_plan: &Plan,
            context: &ReplanContext,
        ) -> Result<Option<PlanDraft>, OracleError> {
            self.replan_calls.lock().unwrap().push((
                failed_plan.intention_id().to_string(),
                context.failed_step.as_ref().map(|s| s.to_string()),
            ));
            self.replans.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    /// Executor answering from a script, defaulting to success.
    struct ScriptedExecutor {
        results: StdMutex<VecDeque<Result<bool, ActionError>>>,
        executed: StdMutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        fn new(results: Vec<Result<bool, ActionError>>) -> Self {
            Self {
                results: StdMutex::new(results.into()),
                executed: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ActionExecutor for ScriptedExecutor {
        async fn execute(&self, step: &PlanStep) -> Result<bool, ActionError> {
            self.executed.lock().unwrap().push(step.action.clone());
            self.results.lock().unwrap().pop_front().unwrap_or(Ok(true))
        }
    }

    /// Planner that never answers in time.
    struct HangingPlanner;

    #[async_trait]
    impl PlanningOracle for HangingPlanner {
        async fn generate_plan(
            &self,
            _goal: &PlanningGoal,
            _beliefs: &[Belief],
        ) -> Result<Option<PlanDraft>, OracleError> {
            std::future::pending().await
        }

        async fn replan(
            &self,
            _failed_plan: &Plan,
            _context: &ReplanContext,
        ) -> Result<Option<PlanDraft>, OracleError> {
            std::future::pending().await
        }
    }

    // ==================== Helpers ====================

    fn limits(steps: usize) -> PlanEngineLimits {
        PlanEngineLimits {
            max_steps_per_tick: steps,
            max_replans: 3,
            oracle_timeout: Duration::from_millis(100),
        }
    }

    fn engine(planner: impl PlanningOracle + 'static, executor: Arc<ScriptedExecutor>, steps: usize) -> PlanEngine {
        PlanEngine::new(Arc::new(planner), executor, limits(steps))
    }

    fn set_with(intention: Intention) -> (IntentionSet, IntentionId) {
        let mut set = IntentionSet::new();
        let id = set.commit(intention).unwrap().clone();
        (set, id)
    }

    fn planned(desire: &Desire, draft: PlanDraft) -> Intention {
        let mut intention = Intention::from_desire(desire);
        intention.plan = Some(Plan::new(intention.id.clone(), intention.goal.clone(), draft));
        intention
    }

    fn three_step_draft() -> PlanDraft {
        PlanDraft::new(vec![
            PlanStep::new("fetch").with_id("s1"),
            PlanStep::new("carry").with_id("s2"),
            PlanStep::new("drop").with_id("s3"),
        ])
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_scenario_failed_step_triggers_replan() {
        let planner = ScriptedPlanner::new().with_replan(Ok(Some(PlanDraft::new(vec![
            PlanStep::new("push").with_id("n1"),
            PlanStep::new("drop").with_id("n2"),
        ]))));
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(true), Ok(false)]));
        let engine = engine(planner, executor.clone(), 4);

        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let plan_id = set.get(&id).unwrap().plan.as_ref().unwrap().id().clone();
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;

        assert_eq!(*executor.executed.lock().unwrap(), vec!["fetch", "carry"]);
        assert!(matches!(outcomes[0], StepOutcome::Completed { .. }));
        assert!(matches!(outcomes[1], StepOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], StepOutcome::Replanned { steps: 2, attempt: 1, .. }));

        let intention = set.get(&id).unwrap();
        let plan = intention.plan.as_ref().unwrap();
        assert_eq!(plan.id(), &plan_id);
        assert_eq!(plan.intention_id(), &id);
        assert_eq!(plan.steps().len(), 2);
        assert!(!plan.is_completed());
        assert_eq!(plan.get_next_step().unwrap().id.as_str(), "n1");
        assert_eq!(intention.status, IntentionStatus::Active);
    }

    #[tokio::test]
    async fn test_replan_receives_failed_step() {
        let planner = Arc::new(ScriptedPlanner::new().with_replan(Ok(None)));
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(false)]));
        let engine = PlanEngine::new(planner.clone(), executor, limits(4));

        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;

        assert_eq!(
            *planner.replan_calls.lock().unwrap(),
            vec![(id.to_string(), Some("s1".to_string()))]
        );
        assert!(matches!(outcomes.last(), Some(StepOutcome::Exhausted { .. })));
        let intention = set.get(&id).unwrap();
        assert_eq!(intention.status, IntentionStatus::Failed);
        assert!(intention.plan.as_ref().unwrap().is_failed());
    }

    #[tokio::test]
    async fn test_replan_limit_exhausts() {
        let planner = ScriptedPlanner::new();
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(false)]));
        let engine = PlanEngine::new(
            Arc::new(planner),
            executor,
            PlanEngineLimits {
                max_replans: 0,
                ..limits(4)
            },
        );
        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let pool = Mutex::new(ResourcePool::new());

        engine.execute(&mut set, &pool, &[]).await;
        assert_eq!(set.get(&id).unwrap().status, IntentionStatus::Failed);
    }

    #[tokio::test]
    async fn test_oracle_error_defers_replan_to_plan_phase() {
        let planner = ScriptedPlanner::new()
            .with_replan(Err(OracleError::Unavailable("down".to_string())))
            .with_replan(Ok(Some(PlanDraft::from_actions(["retry"]))));
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(false)]));
        let engine = engine(planner, executor.clone(), 4);

        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;
        assert!(matches!(outcomes.last(), Some(StepOutcome::ReplanDeferred { .. })));
        // no retry within the same tick
        assert_eq!(executor.executed.lock().unwrap().len(), 1);
        let plan = set.get(&id).unwrap().plan.as_ref().unwrap();
        assert!(plan.needs_replan());

        let (outcome, error) = engine.ensure_plans(&mut set, &[]).await;
        assert!(error.is_none());
        assert!(matches!(outcome.steps[0], StepOutcome::Replanned { steps: 1, .. }));
        let plan = set.get(&id).unwrap().plan.as_ref().unwrap();
        assert_eq!(plan.get_next_step().unwrap().action, "retry");
    }

    #[tokio::test]
    async fn test_executor_error_fails_intention() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Err(ActionError::UnknownAction(
            "fetch".to_string(),
        ))]));
        let engine = engine(ScriptedPlanner::new(), executor, 4);
        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;
        assert!(matches!(outcomes[0], StepOutcome::ExecutorError { .. }));
        assert_eq!(set.get(&id).unwrap().status, IntentionStatus::Failed);
    }

    #[tokio::test]
    async fn test_plan_runs_to_completion() {
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let engine = engine(ScriptedPlanner::new(), executor, 10);
        let desire = Desire::new("move box", 5.0);
        let (mut set, id) = set_with(planned(&desire, three_step_draft()));
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;
        assert_eq!(outcomes.len(), 4);
        assert!(matches!(outcomes[3], StepOutcome::PlanCompleted { .. }));
        assert_eq!(set.get(&id).unwrap().status, IntentionStatus::Completed);
    }

    #[tokio::test]
    async fn test_step_budget_shared_by_priority_score() {
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let engine = engine(ScriptedPlanner::new(), executor.clone(), 2);

        let urgent = Desire::new("urgent", 1.0).with_id("u").with_urgency(5.0);
        let calm = Desire::new("calm", 9.0).with_id("c");
        let mut set = IntentionSet::new();
        set.commit(planned(&calm, PlanDraft::from_actions(["c1", "c2"])))
            .unwrap();
        set.commit(planned(&urgent, PlanDraft::from_actions(["u1", "u2"])))
            .unwrap();
        let pool = Mutex::new(ResourcePool::new());

        engine.execute(&mut set, &pool, &[]).await;
        // one step each per round, urgent first
        assert_eq!(*executor.executed.lock().unwrap(), vec!["u1", "c1"]);
    }

    #[tokio::test]
    async fn test_step_resources_reserved_and_consumed() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(true), Ok(false)]));
        let engine = engine(ScriptedPlanner::new(), executor.clone(), 4);
        let desire = Desire::new("work", 1.0);
        let draft = PlanDraft::new(vec![
            PlanStep::new("spend").with_resource("energy", 3.0),
            PlanStep::new("try").with_resource("energy", 3.0),
            PlanStep::new("never").with_resource("energy", 3.0),
        ]);
        let (mut set, _) = set_with(planned(&desire, draft));
        let pool = Mutex::new(ResourcePool::new().with("energy", 7.0));

        engine.execute(&mut set, &pool, &[]).await;
        // first consumed, second released after failure
        assert_eq!(pool.lock().await.available("energy"), 4.0);
    }

    #[tokio::test]
    async fn test_blocked_step_stays_pending() {
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let engine = engine(ScriptedPlanner::new(), executor.clone(), 4);
        let desire = Desire::new("lift", 1.0);
        let draft = PlanDraft::new(vec![PlanStep::new("lift").with_id("s1").with_resource("arm", 1.0)]);
        let (mut set, id) = set_with(planned(&desire, draft));
        let pool = Mutex::new(ResourcePool::new());

        let outcomes = engine.execute(&mut set, &pool, &[]).await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            StepOutcome::Blocked { resource, .. } if resource == "arm"
        ));
        assert!(executor.executed.lock().unwrap().is_empty());
        let plan = set.get(&id).unwrap().plan.as_ref().unwrap();
        assert_eq!(plan.get_next_step().unwrap().id.as_str(), "s1");
        assert_eq!(set.get(&id).unwrap().status, IntentionStatus::Active);
    }

    #[tokio::test]
    async fn test_ensure_plans_attaches_and_fails() {
        let planner = ScriptedPlanner::new()
            .with_plan(Ok(Some(PlanDraft::from_actions(["a"]))))
            .with_plan(Ok(None));
        let engine = engine(planner, Arc::new(ScriptedExecutor::new(vec![])), 4);
        let mut set = IntentionSet::new();
        let first = set
            .commit(Intention::from_desire(&Desire::new("one", 2.0).with_id("d1")))
            .unwrap()
            .clone();
        let second = set
            .commit(Intention::from_desire(&Desire::new("two", 1.0).with_id("d2")))
            .unwrap()
            .clone();

        let (outcome, error) = engine.ensure_plans(&mut set, &[]).await;
        assert!(error.is_none());
        assert_eq!(outcome.created, vec![first.clone()]);
        assert!(set.get(&first).unwrap().plan.is_some());
        assert_eq!(set.get(&second).unwrap().status, IntentionStatus::Failed);
    }

    #[tokio::test]
    async fn test_empty_plan_completes_intention() {
        let planner = ScriptedPlanner::new().with_plan(Ok(Some(PlanDraft::new(vec![]))));
        let executor = Arc::new(ScriptedExecutor::new(vec![]));
        let engine = engine(planner, executor.clone(), 4);
        let mut set = IntentionSet::new();
        let id = set
            .commit(Intention::from_desire(&Desire::new("noop", 2.0)))
            .unwrap()
            .clone();
        let pool = Mutex::new(ResourcePool::new());

        let (outcome, error) = engine.ensure_plans(&mut set, &[]).await;
        assert!(error.is_none());
        assert_eq!(outcome.created, vec![id.clone()]);
        assert!(matches!(outcome.steps.as_slice(), [StepOutcome::PlanCompleted { .. }]));

        let intention = set.get(&id).unwrap();
        assert!(intention.plan.as_ref().unwrap().is_completed());
        assert_eq!(intention.status, IntentionStatus::Completed);
        assert!(engine.execute(&mut set, &pool, &[]).await.is_empty());
        assert!(executor.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_planning_timeout_reported() {
        let engine = PlanEngine::new(
            Arc::new(HangingPlanner),
            Arc::new(ScriptedExecutor::new(vec![])),
            PlanEngineLimits {
                oracle_timeout: Duration::from_millis(10),
                ..limits(4)
            },
        );
        let mut set = IntentionSet::new();
        let id = set
            .commit(Intention::from_desire(&Desire::new("one", 2.0)))
            .unwrap()
            .clone();

        let (outcome, error) = engine.ensure_plans(&mut set, &[]).await;
        assert_eq!(error, Some(OracleError::Timeout));
        assert!(outcome.created.is_empty());
        let intention = set.get(&id).unwrap();
        assert!(intention.plan.is_none());
        assert_eq!(intention.status, IntentionStatus::Active);
    }
}
