//! Planning oracle port

use super::reasoning_oracle::OracleError;
use async_trait::async_trait;
use bdi_domain::{Belief, Plan, PlanDraft, PlanningGoal, ReplanContext};

/// Produces plans for intentions and replacements for failed plans.
///
/// `Ok(None)` means "no plan exists"; errors mean "could not ask".
#[async_trait]
pub trait PlanningOracle: Send + Sync {
    async fn generate_plan(
        &self,
        goal: &PlanningGoal,
        beliefs: &[Belief],
    ) -> Result<Option<PlanDraft>, OracleError>;

    async fn replan(
        &self,
        failed_plan: &Plan,
        context: &ReplanContext,
    ) -> Result<Option<PlanDraft>, OracleError>;
}

/// Planner that knows no plans.
pub struct NoPlanning;

#[async_trait]
impl PlanningOracle for NoPlanning {
    async fn generate_plan(
        &self,
        _goal: &PlanningGoal,
        _beliefs: &[Belief],
    ) -> Result<Option<PlanDraft>, OracleError> {
        Ok(None)
    }

    async fn replan(
        &self,
        _failed_plan: &Plan,
        _context: &ReplanContext,
    ) -> Result<Option<PlanDraft>, OracleError> {
        Ok(None)
    }
}
