//! otel-docs
//!
//! Runs a periodic unit of work and reports it as correlated traces, metrics
//! and JSON logs. Spans and the work counter are exported to an OTLP/gRPC
//! collector; log records are appended to a local file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use application::WorkLoopService;
use clap::Parser;
use infrastructure::{AppConfig, TracingEventLog, init_logging, init_telemetry};
use tokio::signal;
use tracing::info;

/// otel-docs
#[derive(Debug, Parser)]
#[command(name = "otel-docs")]
#[command(author, version, about = "Emit correlated traces, metrics and logs", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, env = "OTEL_DOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many units of work instead of waiting for a signal
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: Option<u64>,

    /// Console verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Console filter directive for a verbosity count
///
/// Without `-v` the console follows the configured log level.
const fn console_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(iterations) = cli.iterations {
        config.work.max_iterations = Some(iterations);
    }
    let resource = config.resource_attributes()?;

    init_logging(&config.logging, console_filter_from_verbosity(cli.verbose))
        .context("Failed to initialize logging")?;

    let pipeline = init_telemetry(&config.telemetry, &resource)
        .await
        .context("Failed to initialize telemetry")?;

    let service = WorkLoopService::new(
        pipeline.tracer.clone(),
        pipeline.counter.clone(),
        Arc::new(TracingEventLog::new()),
        resource,
        config.work_loop_config(),
    )?;

    info!(
        interval_secs = config.work.interval_secs,
        max_iterations = ?config.work.max_iterations,
        "🚀 Starting work loop"
    );

    let report = service.run_until(shutdown_signal()).await;

    info!(
        iterations = report.iterations,
        reason = ?report.stop_reason,
        "Work loop stopped, flushing telemetry"
    );

    pipeline
        .guard
        .shutdown(config.telemetry.shutdown_timeout())
        .await
        .context("Failed to flush telemetry on shutdown")?;

    info!("👋 Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("📥 Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("📥 Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
