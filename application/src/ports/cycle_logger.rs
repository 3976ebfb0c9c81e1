//! Port for structured cycle event logging.
//!
//! Defines the [`CycleLogger`] trait for recording what an agent did in a
//! tick (beliefs flagged, intentions committed, steps executed, messages
//! sent) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! trace of every agent's decisions (JSONL).

use bdi_domain::AgentId;
use serde_json::Value;

/// A structured cycle event.
pub struct CycleEvent {
    /// Event type identifier (e.g. "tick_started", "step_executed").
    pub event_type: &'static str,
    pub agent_id: AgentId,
    pub tick: u64,
    /// Event-specific fields.
    pub payload: Value,
}

impl CycleEvent {
    pub fn new(event_type: &'static str, agent_id: &AgentId, tick: u64, payload: Value) -> Self {
        Self {
            event_type,
            agent_id: agent_id.clone(),
            tick,
            payload,
        }
    }
}

/// Port for logging cycle events.
///
/// `log` is synchronous and infallible; a failing sink must not disturb the
/// cycle.
pub trait CycleLogger: Send + Sync {
    fn log(&self, event: CycleEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoCycleLogger;

impl CycleLogger for NoCycleLogger {
    fn log(&self, _event: CycleEvent) {}
}
