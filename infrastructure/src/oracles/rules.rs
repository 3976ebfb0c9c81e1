//! Forward-chaining rule engine behind the [`ReasoningOracle`] port.
//!
//! Each [`InferenceRule`] fires when all of its `when` conditions hold over
//! the working belief set and asserts its `then` effects. Conclusions feed
//! later rules until a pass derives nothing new.

use async_trait::async_trait;
use bdi_application::ports::reasoning_oracle::{OracleError, ReasoningOracle};
use bdi_domain::{Belief, Certainty, Desire, Effect, Precondition};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A condition/conclusion pair over beliefs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRule {
    pub name: String,
    #[serde(default)]
    pub when: Vec<Precondition>,
    pub then: Vec<Effect>,
    /// Upper bound on the certainty of the conclusions.
    #[serde(default)]
    pub certainty: Certainty,
}

impl InferenceRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            when: Vec::new(),
            then: Vec::new(),
            certainty: Certainty::CERTAIN,
        }
    }

    pub fn when(mut self, condition: Precondition) -> Self {
        self.when.push(condition);
        self
    }

    pub fn then(mut self, effect: Effect) -> Self {
        self.then.push(effect);
        self
    }

    pub fn with_certainty(mut self, certainty: Certainty) -> Self {
        self.certainty = certainty;
        self
    }

    /// Certainty of the conclusions, or `None` when the rule does not fire.
    ///
    /// A conclusion is never more certain than the weakest premise it rests
    /// on, scaled by the rule's own certainty.
    fn fire(&self, beliefs: &[Belief], default_min: Certainty) -> Option<Certainty> {
        let mut weakest = 1.0_f64;
        for condition in &self.when {
            let support = beliefs
                .iter()
                .filter(|b| condition.is_met(std::slice::from_ref(*b), default_min))
                .map(|b| b.certainty.value())
                .reduce(f64::max)?;
            weakest = weakest.min(support);
        }
        Some(Certainty::saturating(weakest * self.certainty.value()))
    }

    fn source(&self) -> String {
        format!("rule:{}", self.name)
    }
}

/// Reasoning oracle over a fixed rule set.
///
/// Desires come from agent profiles, so `generate_desires` proposes nothing.
pub struct RuleReasoningOracle {
    rules: Vec<InferenceRule>,
    min_certainty: Certainty,
}

impl RuleReasoningOracle {
    pub fn new(rules: Vec<InferenceRule>) -> Self {
        Self {
            rules,
            min_certainty: Certainty::saturating(0.5),
        }
    }

    /// Certainty a premise needs when its condition sets no threshold.
    pub fn with_min_certainty(mut self, certainty: Certainty) -> Self {
        self.min_certainty = certainty;
        self
    }

    pub fn rules(&self) -> &[InferenceRule] {
        &self.rules
    }

    /// Run the rules to a fixed point and return only the new conclusions.
    pub fn chain(&self, beliefs: &[Belief]) -> Vec<Belief> {
        let mut working: Vec<Belief> = beliefs.iter().filter(|b| !b.is_flagged()).cloned().collect();
        let mut derived = Vec::new();

        // each productive pass adds at least one distinct conclusion
        let max_passes = self.rules.iter().map(|r| r.then.len()).sum::<usize>() + 1;
        for _ in 0..max_passes {
            let mut added = false;
            for rule in &self.rules {
                let Some(certainty) = rule.fire(&working, self.min_certainty) else {
                    continue;
                };
                for effect in &rule.then {
                    let known = working
                        .iter()
                        .any(|b| b.key == effect.key && b.value == effect.value);
                    if known {
                        continue;
                    }
                    debug!("Rule {} concludes {}", rule.name, effect.key);
                    let belief = effect.to_belief(&rule.source()).with_certainty(certainty);
                    working.push(belief.clone());
                    derived.push(belief);
                    added = true;
                }
            }
            if !added {
                break;
            }
        }
        derived
    }
}

#[async_trait]
impl ReasoningOracle for RuleReasoningOracle {
    async fn infer(&self, beliefs: &[Belief]) -> Result<Vec<Belief>, OracleError> {
        Ok(self.chain(beliefs))
    }

    async fn generate_desires(&self, _beliefs: &[Belief]) -> Result<Vec<Desire>, OracleError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdi_domain::BeliefKey;
    use serde_json::json;

    fn certainty(value: f64) -> Certainty {
        Certainty::new(value).unwrap()
    }

    fn wet_ground() -> InferenceRule {
        InferenceRule::new("rain_wets")
            .when(Precondition::equals(BeliefKey::named("weather"), "rain"))
            .then(Effect::new(BeliefKey::named("ground"), "wet"))
    }

    fn slippery() -> InferenceRule {
        InferenceRule::new("wet_slips")
            .when(Precondition::equals(BeliefKey::named("ground"), "wet"))
            .then(Effect::new(BeliefKey::triple("road", "is", "slippery"), true))
    }

    #[tokio::test]
    async fn test_infer_chains_to_fixed_point() {
        // declared out of order on purpose
        let oracle = RuleReasoningOracle::new(vec![slippery(), wet_ground()]);
        let derived = oracle
            .infer(&[Belief::named("weather", "rain")])
            .await
            .unwrap();

        assert_eq!(derived.len(), 2);
        assert!(derived.iter().any(|b| b.key == BeliefKey::named("ground")));
        assert!(
            derived
                .iter()
                .any(|b| b.key == BeliefKey::triple("road", "is", "slippery"))
        );
        assert_eq!(derived[0].source.as_deref(), Some("rule:rain_wets"));
    }

    #[test]
    fn test_rule_silent_without_premise() {
        let oracle = RuleReasoningOracle::new(vec![wet_ground()]);
        assert!(oracle.chain(&[Belief::named("weather", "sun")]).is_empty());
    }

    #[test]
    fn test_known_conclusions_not_rederived() {
        let oracle = RuleReasoningOracle::new(vec![wet_ground()]);
        let beliefs = vec![Belief::named("weather", "rain"), Belief::named("ground", "wet")];
        assert!(oracle.chain(&beliefs).is_empty());
    }

    #[test]
    fn test_conclusion_certainty_bounded_by_premise_and_rule() {
        let rule = wet_ground().with_certainty(certainty(0.8));
        let oracle = RuleReasoningOracle::new(vec![rule]);
        let premise = Belief::named("weather", "rain").with_certainty(certainty(0.5));

        let derived = oracle.chain(&[premise]);
        assert_eq!(derived.len(), 1);
        assert!((derived[0].certainty.value() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_weak_premise_does_not_fire() {
        let oracle = RuleReasoningOracle::new(vec![wet_ground()]).with_min_certainty(certainty(0.7));
        let premise = Belief::named("weather", "rain").with_certainty(certainty(0.6));
        assert!(oracle.chain(&[premise]).is_empty());
    }

    #[test]
    fn test_flagged_premise_ignored() {
        let oracle = RuleReasoningOracle::new(vec![wet_ground()]);
        let mut premise = Belief::named("weather", "rain");
        premise.flag("review", None);
        assert!(oracle.chain(&[premise]).is_empty());
    }

    #[test]
    fn test_rule_without_conditions_always_fires_once() {
        let rule = InferenceRule::new("axiom").then(Effect::new(BeliefKey::named("online"), true));
        let oracle = RuleReasoningOracle::new(vec![rule]);
        let derived = oracle.chain(&[]);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].value, json!(true));
    }

    #[test]
    fn test_oscillating_rules_terminate() {
        let on = InferenceRule::new("on")
            .when(Precondition::equals(BeliefKey::named("light"), "off"))
            .then(Effect::new(BeliefKey::named("light"), "on"));
        let off = InferenceRule::new("off")
            .when(Precondition::equals(BeliefKey::named("light"), "on"))
            .then(Effect::new(BeliefKey::named("light"), "off"));
        let oracle = RuleReasoningOracle::new(vec![on, off]);

        let derived = oracle.chain(&[Belief::named("light", "off")]);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].value, json!("on"));
    }

    #[test]
    fn test_rule_parses_from_toml() {
        let rule: InferenceRule = toml::from_str(
            r#"
            name = "rain_wets"
            certainty = 0.9
            when = [{ key = { kind = "named", name = "weather" }, expected = "rain" }]
            then = [{ key = { kind = "named", name = "ground" }, value = "wet" }]
            "#,
        )
        .unwrap();
        assert_eq!(rule.when.len(), 1);
        assert_eq!(rule.then[0].value, json!("wet"));
        assert_eq!(rule.certainty.value(), 0.9);
    }
}
