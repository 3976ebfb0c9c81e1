//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod cognitive_cycle;
pub mod dispatch;
pub mod message_bus;
pub mod plan_engine;
pub mod runtime;
pub mod tick_report;
