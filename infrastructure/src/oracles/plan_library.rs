//! Planning oracle backed by a library of plan recipes.

use async_trait::async_trait;
use bdi_application::ports::planning_oracle::PlanningOracle;
use bdi_application::ports::reasoning_oracle::OracleError;
use bdi_domain::desire::TEMPLATE_ID_PREFIX;
use bdi_domain::{Belief, DesireId, Plan, PlanDraft, PlanRecipe, PlanningGoal, ReplanContext};
use tracing::debug;

/// Answers goals with recipes from a plan library.
///
/// A recipe matches a goal by description, or by name when the desire was
/// generated from a template (`desire:<goal>`). Recipes for the same goal are
/// alternatives: the first one plans the goal, and the n-th replan gets the
/// (n+1)-th alternative. The oracle keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct PlanLibraryOracle {
    recipes: Vec<PlanRecipe>,
}

impl PlanLibraryOracle {
    pub fn new(recipes: Vec<PlanRecipe>) -> Self {
        Self { recipes }
    }

    pub fn with_recipe(mut self, recipe: PlanRecipe) -> Self {
        self.recipes.push(recipe);
        self
    }

    pub fn recipes(&self) -> &[PlanRecipe] {
        &self.recipes
    }

    fn alternatives<'a>(
        &'a self,
        description: &'a str,
        desire_id: Option<&'a DesireId>,
    ) -> impl Iterator<Item = &'a PlanRecipe> + 'a {
        self.recipes.iter().filter(move |recipe| {
            recipe.goal == description
                || desire_id.is_some_and(|id| {
                    id.as_str().strip_prefix(TEMPLATE_ID_PREFIX) == Some(recipe.goal.as_str())
                })
        })
    }
}

#[async_trait]
impl PlanningOracle for PlanLibraryOracle {
    async fn generate_plan(
        &self,
        goal: &PlanningGoal,
        _beliefs: &[Belief],
    ) -> Result<Option<PlanDraft>, OracleError> {
        let recipe = self
            .alternatives(&goal.description, Some(&goal.desire_id))
            .next();
        if recipe.is_none() {
            debug!("No recipe for goal '{}'", goal.description);
        }
        Ok(recipe.map(PlanRecipe::to_draft))
    }

    async fn replan(
        &self,
        failed_plan: &Plan,
        context: &ReplanContext,
    ) -> Result<Option<PlanDraft>, OracleError> {
        let next = context.attempt as usize + 1;
        let recipe = self
            .alternatives(failed_plan.goal(), Some(&context.desire_id))
            .nth(next);
        if recipe.is_none() {
            debug!(
                "Plan library exhausted for '{}' after {} alternatives",
                failed_plan.goal(),
                next
            );
        }
        Ok(recipe.map(PlanRecipe::to_draft))
    }
}
