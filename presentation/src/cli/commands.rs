//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-agent summary for the terminal
    Text,
    /// Full summaries including final mental state, as JSON
    Json,
}

/// CLI arguments for bdi-agents
#[derive(Parser, Debug)]
#[command(name = "bdi-agents")]
#[command(author, version, about = "Run a society of Belief-Desire-Intention agents")]
#[command(long_about = r#"
bdi-agents runs the agents declared in a configuration file. Every agent
repeats the same cognitive cycle on each tick:

  perceive -> revise -> generate desires -> select intentions
           -> plan -> execute -> emit

Agents talk to each other through FIPA-style messages (INFORM, QUERY,
REQUEST, PROPOSE, ...) on an in-process bus.

Configuration files are loaded from (in priority order):
1. BDI_* environment variables (BDI_CYCLE__MAX_REPLANS=5)
2. --config <path>     Explicit config file
3. ./bdi.toml          Project-level config
4. ~/.config/bdi-agents/config.toml   Global config

Example:
  bdi-agents --ticks 10
  bdi-agents --config society.toml --output json --event-log events.jsonl
"#)]
pub struct Cli {
    /// Ticks each agent runs (runs until Ctrl-C when omitted)
    #[arg(short, long, value_name = "N")]
    pub ticks: Option<u64>,

    /// Milliseconds between ticks (overrides cycle.tick_interval_ms)
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Output format (overrides output.format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory for agent snapshots (overrides persistence.state_dir)
    #[arg(long, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Restore agents from their snapshots before running
    #[arg(long)]
    pub resume: bool,

    /// JSONL file for cycle events (overrides logging.event_log)
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
