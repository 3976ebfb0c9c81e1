//! Plan subdomain: plans, steps, and their state machine.

pub mod entities;

pub use entities::{
    Plan, PlanDraft, PlanRepresentations, PlanStep, PlanningGoal, ReplanContext, StepStatus,
};
