//! Belief subdomain: beliefs, the belief store, and consistency handling.

pub mod consistency;
pub mod entities;
pub mod ontology;
pub mod store;

pub use consistency::{
    ContradictionResolver, Inconsistency, InconsistencyKind, InconsistencyResolver, Resolution,
    ResolutionOutcome, ResolutionReport, ResolveError, ResolverRegistry, SpecificityResolver,
};
pub use entities::{Belief, BeliefKey, Certainty, NEGATION_PREFIX, Percept, ReviewFlag};
pub use ontology::{NoOntology, Ontology, TaxonomyOntology};
pub use store::{BeliefStore, RevisionOutcome};
