//! Agent declarations from TOML (`[[agents]]` array)

use crate::oracles::InferenceRule;
use bdi_domain::desire::TEMPLATE_ID_PREFIX;
use bdi_domain::{
    AgentProfile, Belief, BeliefKey, Certainty, ConfigIssue, ConfigIssueCode, DesireTemplate,
    PlanRecipe, ResourcePool,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// An initial belief, written either as `name = ...` or as a triple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBelief {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    /// Defaults to `true`.
    pub value: Option<Value>,
    pub certainty: Option<f64>,
}

impl FileBelief {
    pub fn to_belief(&self) -> Result<Belief, String> {
        let key = match (&self.name, &self.subject, &self.predicate, &self.object) {
            (Some(name), None, None, None) => BeliefKey::named(name.clone()),
            (None, Some(s), Some(p), Some(o)) => BeliefKey::triple(s.clone(), p.clone(), o.clone()),
            _ => {
                return Err(
                    "a belief needs either `name` or all of `subject`, `predicate`, `object`"
                        .to_string(),
                );
            }
        };
        let certainty = match self.certainty {
            Some(value) => Certainty::new(value).map_err(|e| e.to_string())?,
            None => Certainty::CERTAIN,
        };
        Ok(Belief::new(key, self.value.clone().unwrap_or(Value::Bool(true)))
            .with_certainty(certainty)
            .with_source("config"))
    }
}

/// Raw agent declaration
///
/// # Example
///
/// ```toml
/// [[agents]]
/// id = "robot"
/// role = "cleaner"
/// capabilities = ["charge"]
/// subscriptions = ["weather"]
/// publishes = ["status"]
/// resources = { energy = 10.0 }
/// beliefs = [{ name = "battery", value = "low" }]
///
/// [[agents.desires]]
/// name = "recharge"
/// priority = 8.0
/// when = [{ key = { kind = "named", name = "battery" }, expected = "low" }]
///
/// [[agents.plans]]
/// goal = "recharge"
/// steps = ["go_to_dock", "plug_in"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    pub role: String,
    /// Actions other agents may REQUEST.
    pub capabilities: Vec<String>,
    pub resources: BTreeMap<String, f64>,
    /// Topics subscribed to at startup.
    pub subscriptions: Vec<String>,
    /// Topics informed of the beliefs this agent changes each tick.
    pub publishes: Vec<String>,
    pub beliefs: Vec<FileBelief>,
    pub desires: Vec<DesireTemplate>,
    pub plans: Vec<PlanRecipe>,
    pub rules: Vec<InferenceRule>,
}

impl FileAgentConfig {
    fn role(&self) -> &str {
        if self.role.is_empty() { &self.id } else { &self.role }
    }

    pub fn to_profile(&self) -> AgentProfile {
        let mut profile = AgentProfile::new(self.role());
        profile.capabilities = self.capabilities.iter().cloned().collect();
        profile.desire_templates = self.desires.clone();
        profile.plan_library = self.plans.clone();
        profile.publish_topics = self.publishes.clone();
        profile
    }

    /// Starting pool; negative or non-finite quantities are left out.
    pub fn to_resources(&self) -> ResourcePool {
        self.resources
            .iter()
            .filter(|(_, amount)| valid_amount(**amount))
            .fold(ResourcePool::new(), |pool, (name, amount)| {
                pool.with(name.clone(), *amount)
            })
    }

    /// Initial beliefs; malformed entries are skipped.
    pub fn initial_beliefs(&self) -> Vec<Belief> {
        self.beliefs.iter().filter_map(|b| b.to_belief().ok()).collect()
    }

    pub fn validate(&self, index: usize) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let label = if self.id.is_empty() {
            format!("agents[{}]", index)
        } else {
            format!("agents.{}", self.id)
        };

        if self.id.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue {
                    field: format!("{}.id", label),
                    value: self.id.clone(),
                },
                format!("{}: agent id must not be empty", label),
            ));
        }

        for (name, amount) in &self.resources {
            if !valid_amount(*amount) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidValue {
                        field: format!("{}.resources.{}", label, name),
                        value: amount.to_string(),
                    },
                    format!("{}: resource '{}' = {} ignored", label, name, amount),
                ));
            }
        }

        for (i, belief) in self.beliefs.iter().enumerate() {
            if let Err(reason) = belief.to_belief() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidValue {
                        field: format!("{}.beliefs[{}]", label, i),
                        value: format!("{:?}", belief),
                    },
                    format!("{}.beliefs[{}]: {}, skipped", label, i, reason),
                ));
            }
        }

        for template in &self.desires {
            if !template.priority.is_finite() || !template.urgency.is_finite() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: format!("{}.desires.{}", label, template.name),
                        value: format!("priority={} urgency={}", template.priority, template.urgency),
                    },
                    format!(
                        "{}: desire '{}' needs a finite priority and urgency",
                        label, template.name
                    ),
                ));
            }
            if !self.has_recipe_for(template) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownReference {
                        field: format!("{}.plans", label),
                        value: template.name.clone(),
                    },
                    format!(
                        "{}: no plan recipe for desire '{}', its intentions will fail",
                        label, template.name
                    ),
                ));
            }
        }

        for recipe in &self.plans {
            if recipe.steps.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidValue {
                        field: format!("{}.plans.{}", label, recipe.goal),
                        value: "[]".to_string(),
                    },
                    format!("{}: plan for '{}' has no steps", label, recipe.goal),
                ));
            }
        }

        for rule in &self.rules {
            if rule.then.is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidValue {
                        field: format!("{}.rules.{}", label, rule.name),
                        value: "[]".to_string(),
                    },
                    format!("{}: rule '{}' concludes nothing", label, rule.name),
                ));
            }
        }

        issues
    }

    fn has_recipe_for(&self, template: &DesireTemplate) -> bool {
        let description = template.description.as_deref().unwrap_or(&template.name);
        let id = template.desire_id();
        let name = id.as_str().strip_prefix(TEMPLATE_ID_PREFIX);
        self.plans
            .iter()
            .any(|r| r.goal == description || name == Some(r.goal.as_str()))
    }
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
