//! Oracle adapters: local reasoning and planning backends.
//!
//! - [`RuleReasoningOracle`] forward-chains configured [`InferenceRule`]s and
//!   closes `is_a` triples over a taxonomy.
//! - [`PlanLibraryOracle`] answers planning requests from an agent's plan
//!   library, trying alternatives in declaration order.

mod plan_library;
mod rules;

pub use plan_library::PlanLibraryOracle;
pub use rules::{InferenceRule, RuleReasoningOracle};
