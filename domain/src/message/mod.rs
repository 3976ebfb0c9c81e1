//! Inter-agent messages: the envelope, performatives, and content shapes.

pub mod content;
pub mod entities;

pub use content::{
    INBOX_PREFIX, Proposal, inbox_belief, inbox_key, inform_beliefs, query_key, requested_action,
};
pub use entities::{Message, Performative};
