//! Desire-to-intention selection.
//!
//! Each pass:
//!
//! 1. suspends live intentions whose preconditions stopped holding and
//!    resumes suspended ones whose preconditions hold again,
//! 2. walks active desires by priority (descending, ties by id) and commits
//!    the achievable ones, subject to the concurrency cap and the conflict
//!    policy.
//!
//! Committing checks resources but reserves nothing; reservation happens
//! when a plan step executes.

use super::entities::{Intention, IntentionSet, IntentionStatus};
use crate::belief::entities::{Belief, Certainty};
use crate::core::error::DomainError;
use crate::core::ids::{DesireId, IntentionId};
use crate::desire::entities::all_met;
use crate::desire::set::DesireSet;
use crate::resource::ResourcePool;
use serde::{Deserialize, Serialize};

/// Knobs of a selection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionPolicy {
    pub max_active_intentions: usize,
    pub min_precondition_certainty: Certainty,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_active_intentions: 3,
            min_precondition_certainty: Certainty::saturating(0.5),
        }
    }
}

/// Why a desire was not committed this pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeferReason {
    /// The active-intention cap is reached.
    CapacityReached,
    /// Conflicts with intentions of equal or higher priority.
    Conflict { with: Vec<IntentionId> },
    Unachievable,
    InsufficientResources { resource: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deferral {
    pub desire_id: DesireId,
    #[serde(flatten)]
    pub reason: DeferReason,
}

/// An intention dropped in favor of a higher-priority desire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedIntention {
    pub intention_id: IntentionId,
    pub desire_id: DesireId,
    pub overridden_by: DesireId,
}

/// Everything a selection pass changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionOutcome {
    pub committed: Vec<IntentionId>,
    pub dropped: Vec<DroppedIntention>,
    pub deferred: Vec<Deferral>,
    pub suspended: Vec<IntentionId>,
    pub resumed: Vec<IntentionId>,
}

impl SelectionOutcome {
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
            && self.dropped.is_empty()
            && self.deferred.is_empty()
            && self.suspended.is_empty()
            && self.resumed.is_empty()
    }
}

/// Run one selection pass over `desires` against the belief snapshot.
///
/// Errors only if the resulting set would hold two live intentions for one
/// desire, which the pass itself never produces.
pub fn select_intentions(
    intentions: &mut IntentionSet,
    desires: &DesireSet,
    beliefs: &[Belief],
    resources: &ResourcePool,
    policy: &SelectionPolicy,
) -> Result<SelectionOutcome, DomainError> {
    let mut outcome = SelectionOutcome::default();
    let threshold = policy.min_precondition_certainty;

    reconsider_live(intentions, beliefs, policy, &mut outcome);

    for desire in desires.active_by_priority() {
        if intentions.live_for(&desire.id).is_some() {
            continue;
        }

        let defer = |reason| Deferral {
            desire_id: desire.id.clone(),
            reason,
        };

        if !all_met(&desire.preconditions, beliefs, threshold) {
            outcome.deferred.push(defer(DeferReason::Unachievable));
            continue;
        }
        if let Err(DomainError::InsufficientResource { resource, .. }) =
            resources.check(&desire.required_resources)
        {
            outcome
                .deferred
                .push(defer(DeferReason::InsufficientResources { resource }));
            continue;
        }

        let conflicting: Vec<&Intention> = intentions
            .iter()
            .filter(|i| i.is_live() && i.conflicts_with(desire))
            .collect();

        if !conflicting.is_empty() {
            let outranks_all = conflicting.iter().all(|i| desire.priority > i.priority);
            if !outranks_all {
                let with = conflicting.iter().map(|i| i.id.clone()).collect();
                outcome.deferred.push(defer(DeferReason::Conflict { with }));
                continue;
            }
        }

        let freed = conflicting
            .iter()
            .filter(|i| i.status == IntentionStatus::Active)
            .count();
        if intentions.active_count() - freed >= policy.max_active_intentions {
            outcome.deferred.push(defer(DeferReason::CapacityReached));
            continue;
        }

        let to_drop: Vec<IntentionId> = conflicting.iter().map(|i| i.id.clone()).collect();
        for id in to_drop {
            if let Some(dropped) = intentions.remove(&id) {
                outcome.dropped.push(DroppedIntention {
                    intention_id: dropped.id,
                    desire_id: dropped.desire_id,
                    overridden_by: desire.id.clone(),
                });
            }
        }

        let id = intentions.commit(Intention::from_desire(desire))?.clone();
        outcome.committed.push(id);
    }

    intentions.assert_unique_desires()?;
    Ok(outcome)
}

fn reconsider_live(
    intentions: &mut IntentionSet,
    beliefs: &[Belief],
    policy: &SelectionPolicy,
    outcome: &mut SelectionOutcome,
) {
    let threshold = policy.min_precondition_certainty;
    let mut active = intentions.active_count();
    for intention in intentions.iter_mut() {
        let holds = all_met(&intention.preconditions, beliefs, threshold);
        match intention.status {
            IntentionStatus::Active if !holds => {
                intention.status = IntentionStatus::Suspended;
                active -= 1;
                outcome.suspended.push(intention.id.clone());
            }
            IntentionStatus::Suspended if holds && active < policy.max_active_intentions => {
                intention.status = IntentionStatus::Active;
                active += 1;
                outcome.resumed.push(intention.id.clone());
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::entities::BeliefKey;
    use crate::desire::entities::{Desire, Precondition};

    fn policy(cap: usize) -> SelectionPolicy {
        SelectionPolicy {
            max_active_intentions: cap,
            min_precondition_certainty: Certainty::new(0.5).unwrap(),
        }
    }

    fn committed_desires(set: &IntentionSet) -> Vec<String> {
        let mut ids: Vec<_> = set
            .iter()
            .filter(|i| i.is_live())
            .map(|i| i.desire_id.to_string())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_scenario_commits_only_achievable_desire() {
        let beliefs = vec![Belief::named("path_clear", true)];
        let pool = ResourcePool::new().with("energy", 5.0);
        let desires: DesireSet = vec![
            Desire::new("deliver", 9.0)
                .with_id("D")
                .with_precondition(Precondition::equals(BeliefKey::named("path_clear"), true))
                .with_resource("energy", 2.0),
            Desire::new("inspect", 5.0)
                .with_id("E")
                .with_precondition(Precondition::holds(BeliefKey::named("door_open"))),
        ]
        .into_iter()
        .collect();

        let mut intentions = IntentionSet::new();
        let outcome =
            select_intentions(&mut intentions, &desires, &beliefs, &pool, &policy(3)).unwrap();

        assert_eq!(outcome.committed.len(), 1);
        assert_eq!(committed_desires(&intentions), vec!["D"]);
        assert_eq!(
            outcome.deferred,
            vec![Deferral {
                desire_id: "E".into(),
                reason: DeferReason::Unachievable
            }]
        );
        // committing reserves nothing
        assert_eq!(pool.available("energy"), 5.0);
    }

    #[test]
    fn test_reselection_does_not_duplicate() {
        let desires: DesireSet = vec![Desire::new("a", 1.0).with_id("a")].into_iter().collect();
        let mut intentions = IntentionSet::new();
        let pool = ResourcePool::new();
        select_intentions(&mut intentions, &desires, &[], &pool, &policy(3)).unwrap();
        let second = select_intentions(&mut intentions, &desires, &[], &pool, &policy(3)).unwrap();
        assert!(second.committed.is_empty());
        assert_eq!(intentions.len(), 1);
    }

    #[test]
    fn test_insufficient_resources_defers() {
        let desires: DesireSet = vec![Desire::new("lift", 4.0).with_id("lift").with_resource("arm", 2.0)]
            .into_iter()
            .collect();
        let pool = ResourcePool::new().with("arm", 1.0);
        let mut intentions = IntentionSet::new();
        let outcome = select_intentions(&mut intentions, &desires, &[], &pool, &policy(3)).unwrap();
        assert!(intentions.is_empty());
        assert_eq!(
            outcome.deferred[0].reason,
            DeferReason::InsufficientResources {
                resource: "arm".to_string()
            }
        );
    }

    #[test]
    fn test_cap_defers_lower_priority() {
        let desires: DesireSet = vec![
            Desire::new("a", 3.0).with_id("a"),
            Desire::new("b", 2.0).with_id("b"),
            Desire::new("c", 1.0).with_id("c"),
        ]
        .into_iter()
        .collect();
        let mut intentions = IntentionSet::new();
        let outcome =
            select_intentions(&mut intentions, &desires, &[], &ResourcePool::new(), &policy(2))
                .unwrap();
        assert_eq!(committed_desires(&intentions), vec!["a", "b"]);
        assert_eq!(outcome.deferred[0].desire_id.as_str(), "c");
        assert_eq!(outcome.deferred[0].reason, DeferReason::CapacityReached);
    }

    #[test]
    fn test_higher_priority_conflict_overrides() {
        let pool = ResourcePool::new().with("arm", 1.0);
        let mut intentions = IntentionSet::new();

        let low: DesireSet = vec![Desire::new("wave", 2.0).with_id("wave").with_resource("arm", 1.0)]
            .into_iter()
            .collect();
        select_intentions(&mut intentions, &low, &[], &pool, &policy(3)).unwrap();

        let mut both = low.clone();
        both.merge(vec![Desire::new("lift", 7.0).with_id("lift").with_resource("arm", 1.0)]);
        let outcome = select_intentions(&mut intentions, &both, &[], &pool, &policy(3)).unwrap();

        assert_eq!(committed_desires(&intentions), vec!["lift"]);
        assert_eq!(outcome.dropped.len(), 1);
        assert_eq!(outcome.dropped[0].desire_id.as_str(), "wave");
        assert_eq!(outcome.dropped[0].overridden_by.as_str(), "lift");
        // the dropped desire is reconsidered and deferred against the winner
        assert!(matches!(
            outcome.deferred[0].reason,
            DeferReason::Conflict { .. }
        ));
    }

    #[test]
    fn test_equal_priority_conflict_is_deferred() {
        let pool = ResourcePool::new().with("arm", 1.0);
        let mut intentions = IntentionSet::new();
        let first: DesireSet = vec![Desire::new("wave", 5.0).with_id("wave").with_resource("arm", 1.0)]
            .into_iter()
            .collect();
        select_intentions(&mut intentions, &first, &[], &pool, &policy(3)).unwrap();

        let mut both = first.clone();
        both.merge(vec![Desire::new("point", 5.0).with_id("point").with_resource("arm", 1.0)]);
        let outcome = select_intentions(&mut intentions, &both, &[], &pool, &policy(3)).unwrap();

        assert_eq!(committed_desires(&intentions), vec!["wave"]);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn test_suspend_and_resume() {
        let key = BeliefKey::named("daylight");
        let desires: DesireSet = vec![
            Desire::new("garden", 4.0)
                .with_id("garden")
                .with_precondition(Precondition::equals(key.clone(), true)),
        ]
        .into_iter()
        .collect();
        let pool = ResourcePool::new();
        let mut intentions = IntentionSet::new();

        let day = vec![Belief::named("daylight", true)];
        select_intentions(&mut intentions, &desires, &day, &pool, &policy(3)).unwrap();

        let night = vec![Belief::named("daylight", false)];
        let outcome = select_intentions(&mut intentions, &desires, &night, &pool, &policy(3)).unwrap();
        assert_eq!(outcome.suspended.len(), 1);
        assert!(outcome.committed.is_empty());
        assert_eq!(intentions.active_count(), 0);

        let outcome = select_intentions(&mut intentions, &desires, &day, &pool, &policy(3)).unwrap();
        assert_eq!(outcome.resumed.len(), 1);
        assert_eq!(intentions.active_count(), 1);
        assert_eq!(intentions.len(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn desire_strategy() -> impl Strategy<Value = Desire> {
            (0u8..8, 0u8..10, prop::option::of(0u8..3)).prop_map(|(id, priority, resource)| {
                let desire = Desire::new(format!("d{id}"), priority as f64).with_id(format!("d{id}"));
                match resource {
                    Some(r) => desire.with_resource(format!("r{r}"), 1.0),
                    None => desire,
                }
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            /// After any sequence of passes, no desire has two live
            /// intentions and the cap is respected.
            #[test]
            fn prop_unique_desires_and_cap(
                rounds in prop::collection::vec(prop::collection::vec(desire_strategy(), 0..6), 1..6),
                cap in 1usize..4,
            ) {
                let pool = ResourcePool::new().with("r0", 1.0).with("r1", 1.0).with("r2", 1.0);
                let mut desires = DesireSet::new();
                let mut intentions = IntentionSet::new();
                for round in rounds {
                    desires.merge(round);
                    let result = select_intentions(&mut intentions, &desires, &[], &pool, &policy(cap));
                    prop_assert!(result.is_ok());
                    prop_assert!(intentions.assert_unique_desires().is_ok());
                    prop_assert!(intentions.active_count() <= cap);
                }
            }
        }
    }
}
