//! Console output formatter for agent society runs

use bdi_application::{RuntimeSummary, StepOutcome, TickReport};
use bdi_domain::{ConfigIssue, IntentionStatus, Severity};
use colored::Colorize;

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every agent's summary
    pub fn format(summaries: &[RuntimeSummary]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("BDI Society Results"));
        output.push('\n');

        if summaries.is_empty() {
            output.push_str(&format!("\n{}\n", "No agents ran.".dimmed()));
        }

        for summary in summaries {
            output.push_str(&Self::format_agent(summary));
        }

        output.push_str(&Self::footer());
        output
    }

    fn format_agent(summary: &RuntimeSummary) -> String {
        let mut output = Self::section_header(&format!(
            "{} ({} ticks)",
            summary.agent_id, summary.ticks
        ));

        let state = &summary.final_state;
        output.push_str(&format!(
            "{} {}   {} {}   {} {}\n",
            "Steps:".cyan().bold(),
            summary.steps_executed(),
            "Messages sent:".cyan().bold(),
            summary.messages_sent(),
            "Intentions completed:".cyan().bold(),
            summary.intentions_completed(),
        ));

        output.push_str(&format!("\n{}\n", "Beliefs".yellow().bold()));
        if state.beliefs.is_empty() {
            output.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for belief in state.beliefs.iter() {
            let line = format!(
                "  {} = {} ({:.2})",
                belief.key,
                belief.value,
                belief.certainty.value()
            );
            if belief.is_flagged() {
                output.push_str(&format!("{} {}\n", line.red(), "[review]".red().bold()));
            } else {
                output.push_str(&line);
                output.push('\n');
            }
        }

        if !state.desires.is_empty() {
            output.push_str(&format!("\n{}\n", "Desires".yellow().bold()));
            for desire in state.desires.iter() {
                output.push_str(&format!(
                    "  {} {} (priority {}, {})\n",
                    "-".dimmed(),
                    desire.description,
                    desire.priority,
                    desire.status.as_str()
                ));
            }
        }

        if !state.intentions.is_empty() {
            output.push_str(&format!("\n{}\n", "Intentions".yellow().bold()));
            for intention in state.intentions.iter() {
                let status = match intention.status {
                    IntentionStatus::Completed => intention.status.as_str().green(),
                    IntentionStatus::Failed => intention.status.as_str().red(),
                    IntentionStatus::Active | IntentionStatus::Suspended => {
                        intention.status.as_str().normal()
                    }
                };
                let progress = intention
                    .plan
                    .as_ref()
                    .map(|p| {
                        let (done, total) = p.progress();
                        format!(" [{}/{}]", done, total)
                    })
                    .unwrap_or_default();
                output.push_str(&format!("  {} {}{}\n", status, intention.goal, progress));
            }
        }

        let errors: Vec<&String> = summary.recent.iter().flat_map(|r| r.errors.iter()).collect();
        if summary.totals.errors > 0 {
            output.push_str(&format!(
                "\n{} ({})\n",
                "Errors".red().bold(),
                summary.totals.errors
            ));
            for error in &errors {
                output.push_str(&format!("  {}\n", error));
            }
            let earlier = summary.totals.errors.saturating_sub(errors.len());
            if earlier > 0 {
                output.push_str(&format!("  {}\n", format!("... {} earlier", earlier).dimmed()));
            }
        }

        output
    }

    /// Format as JSON
    pub fn format_json(summaries: &[RuntimeSummary]) -> String {
        serde_json::to_string_pretty(summaries).unwrap_or_else(|e| {
            format!("{{\"error\": \"Failed to serialize: {}\"}}", e)
        })
    }

    /// One line per tick, for plain progress output
    pub fn format_tick(report: &TickReport) -> String {
        let mut parts = vec![format!(
            "{} tick {}",
            report.agent_id.as_str().bold(),
            report.tick
        )];
        if report.is_idle() {
            parts.push("idle".dimmed().to_string());
        }
        if report.messages_received > 0 {
            parts.push(format!("{} received", report.messages_received));
        }
        if !report.selection.committed.is_empty() {
            parts.push(format!("{} committed", report.selection.committed.len()));
        }
        for step in &report.steps {
            parts.push(Self::format_step(step));
        }
        for skipped in &report.skipped_phases {
            parts.push(format!("{} {}", "skipped".yellow(), skipped.phase.as_str()));
        }
        if report.messages_sent > 0 {
            parts.push(format!("{} sent", report.messages_sent));
        }
        parts.join(", ")
    }

    fn format_step(step: &StepOutcome) -> String {
        match step {
            StepOutcome::Completed { action, .. } => format!("{} {}", "v".green(), action),
            StepOutcome::Failed { action, .. } => format!("{} {}", "x".red(), action),
            StepOutcome::Blocked { resource, .. } => {
                format!("{} {}", "blocked on".yellow(), resource)
            }
            StepOutcome::RequestHandled {
                requester,
                action,
                success,
            } => {
                let mark = if *success { "v".green() } else { "x".red() };
                format!("{} {} for {}", mark, action, requester)
            }
            other => other.as_str().to_string(),
        }
    }

    /// Format configuration issues, errors first
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|i| i.severity != Severity::Error);
        sorted
            .into_iter()
            .map(|issue| match issue.severity {
                Severity::Error => format!("{} {}", "error:".red().bold(), issue.message),
                Severity::Warning => format!("{} {}", "warning:".yellow().bold(), issue.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdi_application::RunTotals;
    use bdi_domain::{
        AgentId, AgentSnapshot, Belief, BeliefStore, ConfigIssueCode, DesireSet, IntentionSet,
        ResourcePool,
    };

    fn summary() -> RuntimeSummary {
        let mut beliefs = BeliefStore::new();
        beliefs.revise(Belief::named("battery", "full"));
        let mut report = TickReport::new(AgentId::new("robot"), 1);
        report.messages_sent = 2;
        report.errors.push("persistence: disk full".to_string());
        let mut totals = RunTotals::default();
        totals.record(&report);
        RuntimeSummary {
            agent_id: AgentId::new("robot"),
            ticks: 1,
            totals,
            recent: vec![report],
            final_state: AgentSnapshot {
                agent_id: AgentId::new("robot"),
                tick: 1,
                beliefs,
                desires: DesireSet::new(),
                intentions: IntentionSet::new(),
                resources: ResourcePool::new(),
                saved_at: chrono::Utc::now(),
            },
        }
    }

    #[test]
    fn test_text_output_lists_agent_state() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&[summary()]);
        assert!(text.contains("robot (1 ticks)"));
        assert!(text.contains("Messages sent: 2"));
        assert!(text.contains("battery = \"full\" (1.00)"));
        assert!(text.contains("Errors (1)"));
        assert!(text.contains("persistence: disk full"));
        assert!(!text.contains("earlier"));
    }

    #[test]
    fn test_errors_outside_window_counted() {
        colored::control::set_override(false);
        let mut summary = summary();
        summary.totals.errors = 3;
        let text = ConsoleFormatter::format(&[summary]);
        assert!(text.contains("Errors (3)"));
        assert!(text.contains("... 2 earlier"));
    }

    #[test]
    fn test_json_output_is_parseable() {
        let json = ConsoleFormatter::format_json(&[summary()]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["agent_id"], "robot");
        assert_eq!(value[0]["totals"]["messages_sent"], 2);
        assert_eq!(value[0]["recent"][0]["messages_sent"], 2);
    }

    #[test]
    fn test_idle_tick_line() {
        colored::control::set_override(false);
        let line = ConsoleFormatter::format_tick(&TickReport::new(AgentId::new("a"), 4));
        assert_eq!(line, "a tick 4, idle");
    }

    #[test]
    fn test_issues_sorted_errors_first() {
        colored::control::set_override(false);
        let issues = vec![
            ConfigIssue::warning(
                ConfigIssueCode::EmptySection {
                    section: "agents".to_string(),
                },
                "no agents",
            ),
            ConfigIssue::error(
                ConfigIssueCode::DuplicateAgent {
                    id: "a".to_string(),
                },
                "duplicate a",
            ),
        ];
        assert_eq!(
            ConsoleFormatter::format_issues(&issues),
            "error: duplicate a\nwarning: no agents"
        );
    }
}
