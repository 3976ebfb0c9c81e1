//! Progress reporting for agent society runs

use crate::output::console::ConsoleFormatter;
use bdi_application::{CycleProgressNotifier, TickReport};
use bdi_domain::{AgentId, CyclePhase};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// One progress bar per agent, or a spinner when the run has no tick limit
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<AgentId, ProgressBar>>,
    max_ticks: Option<u64>,
}

impl ProgressReporter {
    pub fn new(max_ticks: Option<u64>) -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            max_ticks,
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} tick {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, agent: &AgentId, f: impl FnOnce(&ProgressBar)) {
        let mut bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        let bar = bars.entry(agent.clone()).or_insert_with(|| {
            let bar = match self.max_ticks {
                Some(max) => {
                    let bar = self.multi.add(ProgressBar::new(max));
                    bar.set_style(Self::bar_style());
                    bar
                }
                None => {
                    let bar = self.multi.add(ProgressBar::new_spinner());
                    bar.set_style(Self::spinner_style());
                    bar
                }
            };
            bar.set_prefix(agent.to_string());
            bar
        });
        f(bar);
    }
}

impl CycleProgressNotifier for ProgressReporter {
    fn on_tick_start(&self, agent: &AgentId, tick: u64) {
        self.with_bar(agent, |bar| bar.set_message(format!("tick {}", tick)));
    }

    fn on_phase_complete(&self, agent: &AgentId, phase: CyclePhase) {
        self.with_bar(agent, |bar| bar.set_message(phase.display_name().to_string()));
    }

    fn on_tick_complete(&self, agent: &AgentId, report: &TickReport) {
        self.with_bar(agent, |bar| {
            bar.inc(1);
            let completed = report.intentions_completed.len();
            if completed > 0 {
                bar.set_message(format!("{} {} completed", "v".green(), completed));
            } else {
                bar.set_message(String::new());
            }
        });
    }

    fn on_phase_skipped(&self, agent: &AgentId, phase: CyclePhase, reason: &str) {
        let _ = self.multi.println(format!(
            "{} {} skipped {}: {}",
            "!".yellow(),
            agent,
            phase.display_name(),
            reason
        ));
    }

    fn on_agent_finished(&self, agent: &AgentId, ticks: u64) {
        self.with_bar(agent, |bar| {
            bar.finish_with_message(format!("{} after {} ticks", "done".green(), ticks));
        });
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl CycleProgressNotifier for SimpleProgress {
    fn on_tick_start(&self, _agent: &AgentId, _tick: u64) {}

    fn on_phase_complete(&self, _agent: &AgentId, _phase: CyclePhase) {}

    fn on_tick_complete(&self, _agent: &AgentId, report: &TickReport) {
        println!("{} {}", "->".cyan(), ConsoleFormatter::format_tick(report));
    }

    fn on_phase_skipped(&self, agent: &AgentId, phase: CyclePhase, reason: &str) {
        println!(
            "  {} {} skipped {}: {}",
            "!".yellow(),
            agent,
            phase.display_name(),
            reason
        );
    }

    fn on_agent_finished(&self, agent: &AgentId, ticks: u64) {
        println!("{} {} finished after {} ticks", "v".green(), agent, ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    #[test]
    fn test_one_bar_per_agent() {
        let reporter = ProgressReporter::new(Some(3));
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        let a = AgentId::new("a");
        let b = AgentId::new("b");

        reporter.on_tick_start(&a, 1);
        reporter.on_tick_complete(&a, &TickReport::new(a.clone(), 1));
        reporter.on_tick_start(&b, 1);
        reporter.on_tick_complete(&a, &TickReport::new(a.clone(), 2));

        let bars = reporter.bars.lock().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[&a].position(), 2);
        assert_eq!(bars[&a].length(), Some(3));
        assert_eq!(bars[&b].position(), 0);
    }

    #[test]
    fn test_finished_agent_bar_is_finished() {
        let reporter = ProgressReporter::new(None);
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        let a = AgentId::new("a");
        reporter.on_tick_start(&a, 1);
        reporter.on_agent_finished(&a, 1);
        assert!(reporter.bars.lock().unwrap()[&a].is_finished());
    }
}
