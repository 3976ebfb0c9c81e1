//! Presentation-level configuration
//!
//! Output settings after command-line overrides have been applied.

use crate::cli::commands::{Cli, OutputFormat};
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use bdi_application::{CycleProgressNotifier, NoCycleProgress};
use std::sync::Arc;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress while agents run
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Apply `--output` and `--quiet`.
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(format) = cli.output {
            self.format = format;
        }
        if cli.quiet {
            self.show_progress = false;
        }
        self
    }

    /// Turn terminal colors off globally when disabled.
    pub fn apply_color(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }

    /// Progress notifier for this output mode.
    ///
    /// JSON output stays clean of progress lines. Without a color-capable
    /// terminal, progress is printed as plain lines.
    pub fn progress_notifier(&self, max_ticks: Option<u64>) -> Arc<dyn CycleProgressNotifier> {
        match (self.show_progress, self.format) {
            (false, _) | (_, OutputFormat::Json) => Arc::new(NoCycleProgress),
            (true, OutputFormat::Text) if self.color => Arc::new(ProgressReporter::new(max_ticks)),
            (true, OutputFormat::Text) => Arc::new(SimpleProgress),
        }
    }
}
