//! Progress notification port
//!
//! Defines the interface for reporting progress while agents tick.

use crate::use_cases::tick_report::TickReport;
use bdi_domain::{AgentId, CyclePhase};

/// Callback for progress updates during a run.
///
/// Implementations live in the presentation layer (progress bars, console
/// lines). Several agents report through the same notifier concurrently.
pub trait CycleProgressNotifier: Send + Sync {
    fn on_tick_start(&self, agent: &AgentId, tick: u64);

    fn on_phase_complete(&self, agent: &AgentId, phase: CyclePhase);

    fn on_tick_complete(&self, agent: &AgentId, report: &TickReport);

    /// Called when an oracle failure made the cycle skip a phase.
    fn on_phase_skipped(&self, _agent: &AgentId, _phase: CyclePhase, _reason: &str) {}

    /// Called once an agent's runtime loop ends.
    fn on_agent_finished(&self, _agent: &AgentId, _ticks: u64) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoCycleProgress;

impl CycleProgressNotifier for NoCycleProgress {
    fn on_tick_start(&self, _agent: &AgentId, _tick: u64) {}
    fn on_phase_complete(&self, _agent: &AgentId, _phase: CyclePhase) {}
    fn on_tick_complete(&self, _agent: &AgentId, _report: &TickReport) {}
}
