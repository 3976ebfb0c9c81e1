//! Agent-level domain: cycle phases, role profiles, persisted snapshots.

pub mod phase;
pub mod profile;
pub mod snapshot;

pub use phase::CyclePhase;
pub use profile::{AgentProfile, PlanRecipe, RecipeStep};
pub use snapshot::AgentSnapshot;
