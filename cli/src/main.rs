//! CLI entrypoint for bdi-agents
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use bdi_application::{CycleLogger, NoCycleLogger, run_society};
use bdi_domain::ConfigIssue;
use bdi_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, JsonlCycleLogger, Society, SocietyOptions,
};
use bdi_presentation::{Cli, ConsoleFormatter, OutputConfig, OutputFormat};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);

    // Keep the guard alive so the rolling log is flushed on exit
    let _log_guard = init_logging(cli.verbose, config.logging.log_dir.as_deref());
    info!("Starting bdi-agents with {} agents", config.agents.len());

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("{}", ConsoleFormatter::format_issues(&issues));
    }
    if ConfigIssue::has_errors(&issues) {
        bail!("Configuration has errors, refusing to start");
    }

    let output = OutputConfig {
        format: match config.output.format {
            FileOutputFormat::Text => OutputFormat::Text,
            FileOutputFormat::Json => OutputFormat::Json,
        },
        color: config.output.color,
        show_progress: config.output.show_progress,
    }
    .with_cli_overrides(&cli);
    output.apply_color();

    // === Dependency Injection ===
    let logger: Arc<dyn CycleLogger> = match &config.logging.event_log {
        Some(path) => match JsonlCycleLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => {
                warn!("Event logging disabled");
                Arc::new(NoCycleLogger)
            }
        },
        None => Arc::new(NoCycleLogger),
    };

    let cancellation_token = CancellationToken::new();
    let mut options = SocietyOptions::default()
        .with_logger(logger)
        .with_progress(output.progress_notifier(cli.ticks))
        .with_cancellation(cancellation_token.clone());
    if let Some(ticks) = cli.ticks {
        options = options.with_max_ticks(ticks);
    }
    if let Some(ms) = cli.interval_ms {
        options = options.with_interval(Duration::from_millis(ms));
    }

    let society = Society::build(&config, options).await?;
    for agent in &society.resumed {
        info!("Agent {} resumed from its last snapshot", agent);
    }

    if cli.ticks.is_none() {
        eprintln!("Running until Ctrl-C...");
    }
    let token = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping agents after their current tick");
            token.cancel();
        }
    });

    let summaries = run_society(society.runtimes).await;

    let rendered = match output.format {
        OutputFormat::Text => ConsoleFormatter::format(&summaries),
        OutputFormat::Json => ConsoleFormatter::format_json(&summaries),
    };
    println!("{}", rendered);

    Ok(())
}

fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(dir) = &cli.state_dir {
        config.persistence.state_dir = Some(dir.clone());
    }
    if cli.resume {
        config.persistence.resume = true;
    }
    if let Some(path) = &cli.event_log {
        config.logging.event_log = Some(path.clone());
    }
}

/// Console logging on stderr by verbosity, plus a daily rolling file when a
/// log directory is configured. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bdi-agents.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}
