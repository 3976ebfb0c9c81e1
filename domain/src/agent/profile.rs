//! Per-role configuration of the generic cognitive cycle.
//!
//! Roles differ only in data: which desires they adopt on which beliefs,
//! which actions they accept as requests, and which step sequences they
//! know for a goal.

use crate::desire::template::DesireTemplate;
use crate::plan::entities::{PlanDraft, PlanRepresentations, PlanStep};
use crate::resource::ResourceMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

/// A step of a plan recipe: a bare action name or a detailed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeStep {
    Action(String),
    Detailed {
        action: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        resources: ResourceMap,
    },
}

impl RecipeStep {
    pub fn action(&self) -> &str {
        match self {
            RecipeStep::Action(action) => action,
            RecipeStep::Detailed { action, .. } => action,
        }
    }

    pub fn to_plan_step(&self) -> PlanStep {
        match self {
            RecipeStep::Action(action) => PlanStep::new(action.clone()),
            RecipeStep::Detailed {
                action,
                description,
                resources,
            } => {
                let mut step = PlanStep::new(action.clone());
                if let Some(description) = description {
                    step.description = description.clone();
                }
                step.resources = resources.clone();
                step
            }
        }
    }
}

/// A known step sequence for a goal. Several recipes for the same goal are
/// alternatives, tried in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecipe {
    pub goal: String,
    pub steps: Vec<RecipeStep>,
}

impl PlanRecipe {
    pub fn new<I, S>(goal: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            goal: goal.into(),
            steps: actions
                .into_iter()
                .map(|a| RecipeStep::Action(a.into()))
                .collect(),
        }
    }

    /// A fresh draft with new step ids; the symbolic form lists the actions.
    pub fn to_draft(&self) -> PlanDraft {
        let actions: Vec<&str> = self.steps.iter().map(RecipeStep::action).collect();
        PlanDraft {
            steps: self.steps.iter().map(RecipeStep::to_plan_step).collect(),
            representations: PlanRepresentations {
                symbolic: Some(json!({ "goal": self.goal, "actions": actions })),
                narrative: None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub role: String,
    /// Actions other agents may REQUEST.
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub desire_templates: Vec<DesireTemplate>,
    #[serde(default)]
    pub plan_library: Vec<PlanRecipe>,
    /// Topics that receive an INFORM with the beliefs this agent changed
    /// in a tick.
    #[serde(default)]
    pub publish_topics: Vec<String>,
}

impl AgentProfile {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            ..Default::default()
        }
    }

    pub fn with_capability(mut self, action: impl Into<String>) -> Self {
        self.capabilities.insert(action.into());
        self
    }

    pub fn with_template(mut self, template: DesireTemplate) -> Self {
        self.desire_templates.push(template);
        self
    }

    pub fn with_recipe(mut self, recipe: PlanRecipe) -> Self {
        self.plan_library.push(recipe);
        self
    }

    pub fn with_publication(mut self, topic: impl Into<String>) -> Self {
        self.publish_topics.push(topic.into());
        self
    }

    pub fn can(&self, action: &str) -> bool {
        self.capabilities.contains(action)
    }

    pub fn recipes_for<'a>(&'a self, goal: &'a str) -> impl Iterator<Item = &'a PlanRecipe> + 'a {
        self.plan_library.iter().filter(move |r| r.goal == goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_steps_from_mixed_shapes() {
        let recipe: PlanRecipe = serde_json::from_value(json!({
            "goal": "recharge",
            "steps": ["go_to_dock", {"action": "charge", "resources": {"dock": 1.0}}]
        }))
        .unwrap();
        let draft = recipe.to_draft();
        assert_eq!(draft.steps.len(), 2);
        assert_eq!(draft.steps[0].action, "go_to_dock");
        assert_eq!(draft.steps[1].resources["dock"], 1.0);
        assert_eq!(
            draft.representations.symbolic,
            Some(json!({"goal": "recharge", "actions": ["go_to_dock", "charge"]}))
        );
    }

    #[test]
    fn test_fresh_step_ids_per_draft() {
        let recipe = PlanRecipe::new("wave", ["raise_arm"]);
        assert_ne!(recipe.to_draft().steps[0].id, recipe.to_draft().steps[0].id);
    }

    #[test]
    fn test_recipes_for_goal_in_order() {
        let profile = AgentProfile::new("porter")
            .with_capability("status")
            .with_recipe(PlanRecipe::new("carry", ["lift", "walk"]))
            .with_recipe(PlanRecipe::new("tidy", ["sweep"]))
            .with_recipe(PlanRecipe::new("carry", ["drag"]));
        let carry: Vec<_> = profile.recipes_for("carry").collect();
        assert_eq!(carry.len(), 2);
        assert_eq!(carry[1].steps[0].action(), "drag");
        assert!(profile.can("status"));
        assert!(!profile.can("fly"));
    }
}
