//! Domain layer for bdi-agents
//!
//! This crate contains the entities, value objects, and invariants of the
//! Belief-Desire-Intention model. It has no dependencies on async runtimes,
//! I/O, or logging.
//!
//! # Core Concepts
//!
//! ## Beliefs
//!
//! A [`BeliefStore`] holds at most one [`Belief`] per [`BeliefKey`]. Revising
//! supersedes; the consistency checker finds contradictions and logical
//! inconsistencies (against an [`Ontology`]) and a [`ResolverRegistry`]
//! resolves or flags them.
//!
//! ## Desires and Intentions
//!
//! Desires are candidate goals with a priority. [`select_intentions`] commits
//! achievable desires to [`Intention`]s under a concurrency cap and a
//! priority-based conflict policy.
//!
//! ## Plans
//!
//! A [`Plan`] is an ordered list of [`PlanStep`]s whose completion is derived
//! from its steps.
//!
//! ## Messages
//!
//! Agents talk through immutable [`Message`]s typed by a [`Performative`].

pub mod agent;
pub mod belief;
pub mod core;
pub mod desire;
pub mod intention;
pub mod message;
pub mod plan;
pub mod resource;

// Re-export commonly used types
pub use agent::{AgentProfile, AgentSnapshot, CyclePhase, PlanRecipe, RecipeStep};
pub use belief::{
    Belief, BeliefKey, BeliefStore, Certainty, Inconsistency, InconsistencyKind,
    InconsistencyResolver, NoOntology, Ontology, Percept, ResolutionOutcome, ResolutionReport,
    ResolveError, ResolverRegistry, RevisionOutcome, TaxonomyOntology,
};
pub use core::{
    error::DomainError,
    ids::{AgentId, BeliefId, ConversationId, DesireId, IntentionId, MessageId, PlanId, StepId},
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use desire::{Desire, DesireSet, DesireStatus, DesireTemplate, Effect, Precondition};
pub use intention::{
    DeferReason, Deferral, DroppedIntention, Intention, IntentionSet, IntentionStatus,
    SelectionOutcome, SelectionPolicy, select_intentions,
};
pub use message::{Message, Performative, Proposal};
pub use plan::{Plan, PlanDraft, PlanRepresentations, PlanStep, PlanningGoal, ReplanContext, StepStatus};
pub use resource::{ResourceMap, ResourcePool};
