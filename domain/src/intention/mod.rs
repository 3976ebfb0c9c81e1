//! Intention subdomain: committed desires and the selector that commits them.

pub mod entities;
pub mod selector;

pub use entities::{Intention, IntentionSet, IntentionStatus};
pub use selector::{
    DeferReason, Deferral, DroppedIntention, SelectionOutcome, SelectionPolicy, select_intentions,
};
