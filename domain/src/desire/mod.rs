//! Desire subdomain

pub mod entities;
pub mod set;
pub mod template;

pub use entities::{Desire, DesireStatus, Effect, Precondition, all_met};
pub use set::DesireSet;
pub use template::{DesireTemplate, TEMPLATE_ID_PREFIX, evaluate_templates};
