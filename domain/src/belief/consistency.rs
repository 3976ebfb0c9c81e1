//! Consistency checking and inconsistency resolution.
//!
//! Detection scans every pair of beliefs (O(n²); belief sets are small per
//! agent) and classifies it:
//!
//! - **Contradiction**: two triples with the same subject and predicate but a
//!   different object, or predicates `P` / `not_P` on the same subject and
//!   object.
//! - **Logical inconsistency**: two triples about the same subject whose
//!   concepts the [`Ontology`] declares mutually exclusive.
//!
//! Resolution dispatches each record to the resolver registered for its kind
//! in a [`ResolverRegistry`]. A failing resolver never aborts the batch; its
//! record is reported as [`ResolutionOutcome::Failed`].

use super::entities::Belief;
use super::ontology::Ontology;
use super::store::BeliefStore;
use crate::core::ids::BeliefId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

/// Kind of a detected inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    Contradiction,
    LogicalInconsistency,
}

impl InconsistencyKind {
    pub fn as_str(&self) -> &str {
        match self {
            InconsistencyKind::Contradiction => "contradiction",
            InconsistencyKind::LogicalInconsistency => "logical_inconsistency",
        }
    }
}

impl std::fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected inconsistency between two beliefs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub kind: InconsistencyKind,
    pub first: Belief,
    pub second: Belief,
}

/// Scan all belief pairs and report every inconsistency.
///
/// Pairs where both beliefs are already flagged for review are not reported
/// again.
pub fn detect(beliefs: &[Belief], ontology: &dyn Ontology) -> Vec<Inconsistency> {
    let mut found = Vec::new();
    for (i, first) in beliefs.iter().enumerate() {
        for second in &beliefs[i + 1..] {
            if first.is_flagged() && second.is_flagged() {
                continue;
            }
            let kind = if are_contradictory(first, second) {
                Some(InconsistencyKind::Contradiction)
            } else if are_logically_inconsistent(first, second, ontology) {
                Some(InconsistencyKind::LogicalInconsistency)
            } else {
                None
            };
            if let Some(kind) = kind {
                found.push(Inconsistency {
                    kind,
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }
    }
    found
}

fn are_contradictory(a: &Belief, b: &Belief) -> bool {
    if a.key.negates(&b.key) {
        return true;
    }
    match (a.key.predicate(), b.key.predicate()) {
        (Some(pa), Some(pb)) => {
            a.key.subject() == b.key.subject() && pa == pb && a.key.object() != b.key.object()
        }
        _ => false,
    }
}

fn are_logically_inconsistent(a: &Belief, b: &Belief, ontology: &dyn Ontology) -> bool {
    if a.key.subject() != b.key.subject() {
        return false;
    }
    match (a.concept(), b.concept()) {
        (Some(ca), Some(cb)) => ontology.mutually_exclusive(ca, cb),
        _ => false,
    }
}

/// What a resolver did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// One belief was removed, the other kept.
    Removed { kept: BeliefId, removed: BeliefId },
    /// Neither belief could be preferred; both are flagged for review.
    Flagged { beliefs: Vec<BeliefId> },
}

/// Errors raised by a resolver for a single record.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum ResolveError {
    /// A belief of the record is no longer in the store (an earlier
    /// resolution in the same batch already removed it).
    #[error("Belief {0} is no longer in the store")]
    Stale(BeliefId),

    #[error("Resolver failed: {0}")]
    Other(String),
}

/// Resolves one kind of inconsistency.
pub trait InconsistencyResolver: Send + Sync {
    fn resolve(
        &self,
        store: &mut BeliefStore,
        record: &Inconsistency,
        ontology: &dyn Ontology,
    ) -> Result<Resolution, ResolveError>;
}

/// Last-writer-wins: keep the belief with the later timestamp.
///
/// Equal timestamps keep the higher certainty, then the greater id, so the
/// choice is deterministic.
pub struct ContradictionResolver;

impl ContradictionResolver {
    fn precedence(a: &Belief, b: &Belief) -> Ordering {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.certainty.value().total_cmp(&b.certainty.value()))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl InconsistencyResolver for ContradictionResolver {
    fn resolve(
        &self,
        store: &mut BeliefStore,
        record: &Inconsistency,
        _ontology: &dyn Ontology,
    ) -> Result<Resolution, ResolveError> {
        ensure_present(store, record)?;
        let (kept, removed) = match Self::precedence(&record.first, &record.second) {
            Ordering::Less => (&record.second, &record.first),
            _ => (&record.first, &record.second),
        };
        store.remove(&removed.id);
        Ok(Resolution::Removed {
            kept: kept.id.clone(),
            removed: removed.id.clone(),
        })
    }
}

/// Keep the more specific belief; flag both when neither is.
pub struct SpecificityResolver;

impl InconsistencyResolver for SpecificityResolver {
    fn resolve(
        &self,
        store: &mut BeliefStore,
        record: &Inconsistency,
        ontology: &dyn Ontology,
    ) -> Result<Resolution, ResolveError> {
        ensure_present(store, record)?;
        let (a, b) = (&record.first, &record.second);
        let preferred = if ontology.is_more_specific(a, b) {
            Some((a, b))
        } else if ontology.is_more_specific(b, a) {
            Some((b, a))
        } else {
            None
        };

        match preferred {
            Some((kept, removed)) => {
                store.remove(&removed.id);
                Ok(Resolution::Removed {
                    kept: kept.id.clone(),
                    removed: removed.id.clone(),
                })
            }
            None => {
                let reason = format!(
                    "{} is mutually exclusive with {} and neither is more specific",
                    a.key, b.key
                );
                store.flag(&a.id, reason.clone(), Some(b.id.clone()));
                store.flag(&b.id, reason, Some(a.id.clone()));
                Ok(Resolution::Flagged {
                    beliefs: vec![a.id.clone(), b.id.clone()],
                })
            }
        }
    }
}

fn ensure_present(store: &BeliefStore, record: &Inconsistency) -> Result<(), ResolveError> {
    for belief in [&record.first, &record.second] {
        if store.get_by_id(&belief.id).is_none() {
            return Err(ResolveError::Stale(belief.id.clone()));
        }
    }
    Ok(())
}

/// Outcome of resolving a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved {
        kind: InconsistencyKind,
        kept: BeliefId,
        removed: BeliefId,
    },
    /// Left for manual review; the beliefs are flagged.
    Unresolved {
        kind: InconsistencyKind,
        flagged: Vec<BeliefId>,
    },
    /// No resolver is registered for the kind.
    Skipped { kind: InconsistencyKind },
    Failed {
        kind: InconsistencyKind,
        error: ResolveError,
    },
}

/// Per-record outcomes of a resolution batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub outcomes: Vec<ResolutionOutcome>,
}

impl ResolutionReport {
    pub fn resolved(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Resolved { .. }))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Unresolved { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ResolutionOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ResolutionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Resolvers keyed by inconsistency kind.
pub struct ResolverRegistry {
    resolvers: HashMap<InconsistencyKind, Box<dyn InconsistencyResolver>>,
}

impl ResolverRegistry {
    /// A registry with no resolvers; every record is skipped.
    pub fn empty() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    pub fn register(
        mut self,
        kind: InconsistencyKind,
        resolver: impl InconsistencyResolver + 'static,
    ) -> Self {
        self.resolvers.insert(kind, Box::new(resolver));
        self
    }

    pub fn has_resolver(&self, kind: InconsistencyKind) -> bool {
        self.resolvers.contains_key(&kind)
    }

    /// Resolve every record, in order, against the store.
    pub fn resolve_all(
        &self,
        store: &mut BeliefStore,
        records: &[Inconsistency],
        ontology: &dyn Ontology,
    ) -> ResolutionReport {
        let outcomes = records
            .iter()
            .map(|record| {
                let kind = record.kind;
                let Some(resolver) = self.resolvers.get(&kind) else {
                    return ResolutionOutcome::Skipped { kind };
                };
                match resolver.resolve(store, record, ontology) {
                    Ok(Resolution::Removed { kept, removed }) => {
                        ResolutionOutcome::Resolved {
                            kind,
                            kept,
                            removed,
                        }
                    }
                    Ok(Resolution::Flagged { beliefs }) => ResolutionOutcome::Unresolved {
                        kind,
                        flagged: beliefs,
                    },
                    Err(error) => ResolutionOutcome::Failed { kind, error },
                }
            })
            .collect();
        ResolutionReport { outcomes }
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::empty()
            .register(InconsistencyKind::Contradiction, ContradictionResolver)
            .register(InconsistencyKind::LogicalInconsistency, SpecificityResolver)
    }
}
