//! Application layer for bdi-agents
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::CycleConfig;
pub use ports::{
    action_executor::{ActionError, ActionExecutor, NoopExecutor},
    agent_store::{AgentStore, StoreError},
    cycle_logger::{CycleEvent, CycleLogger, NoCycleLogger},
    cycle_progress::{CycleProgressNotifier, NoCycleProgress},
    planning_oracle::{NoPlanning, PlanningOracle},
    reasoning_oracle::{NoReasoning, OracleError, ReasoningOracle},
};
pub use use_cases::cognitive_cycle::{AgentPorts, CognitiveCycle, CycleError};
pub use use_cases::dispatch::{Dispatched, PendingRequest, PerformativeDispatcher};
pub use use_cases::message_bus::{CommunicationError, Mailbox, MessageBus};
pub use use_cases::plan_engine::{PlanEngine, PlanEngineLimits, PlanPhaseOutcome};
pub use use_cases::runtime::{AgentRuntime, RunTotals, RuntimeSummary, run_society};
pub use use_cases::tick_report::{SkippedPhase, StepOutcome, TickReport};
