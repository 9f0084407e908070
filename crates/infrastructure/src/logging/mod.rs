//! Structured logging
//!
//! Installs the global `tracing` subscriber: a JSON-lines layer appending to
//! the configured log file, plus an optional human-readable console layer.

mod event_log;
mod json_format;
mod sink;
#[cfg(test)]
mod test_writer;

use std::path::PathBuf;

pub use event_log::{TracingEventLog, WORK_EVENT_TARGET};
pub use json_format::{DEFAULT_TIMESTAMP_FORMAT, JsonLines, severity_of};
pub use sink::open_log_file;

use domain::Severity;
use serde::{Deserialize, Serialize};
use tracing::{Subscriber, info, warn};
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::telemetry::TelemetryError;

/// Log sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// File receiving one JSON object per line
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Minimum severity written to the file
    #[serde(default)]
    pub level: Severity,

    /// Continue without the file sink when it cannot be opened
    #[serde(default = "default_true")]
    pub graceful_fallback: bool,

    /// Also log human-readable lines to stdout
    #[serde(default = "default_true")]
    pub console: bool,

    /// `chrono` strftime layout of the `time` field
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_path() -> PathBuf {
    PathBuf::from("/var/log/app/app.log")
}

const fn default_true() -> bool {
    true
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            level: Severity::default(),
            graceful_fallback: default_true(),
            console: default_true(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

/// Target of the notice emitted when the file sink is unavailable
pub const SINK_NOTICE_TARGET: &str = "otel_docs::log_sink";

/// Where log records end up after [`init_logging`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSinkStatus {
    /// Records are appended to this file
    File(PathBuf),
    /// The file could not be opened; only the console layer is active
    ConsoleOnly {
        /// Why the file sink is missing
        reason: String,
    },
}

impl LogSinkStatus {
    /// Whether the file sink is active
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

/// Convert a severity into the per-layer level filter
pub const fn level_filter(severity: Severity) -> LevelFilter {
    match severity {
        Severity::Trace => LevelFilter::TRACE,
        Severity::Debug => LevelFilter::DEBUG,
        Severity::Info => LevelFilter::INFO,
        Severity::Warning => LevelFilter::WARN,
        Severity::Error => LevelFilter::ERROR,
    }
}

/// JSON-lines layer writing to `writer`, filtered at `config.level`
pub fn json_layer<S, W>(writer: W, config: &LoggingConfig) -> impl Layer<S> + use<S, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(JsonLines::new(config.timestamp_format.as_str()))
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(level_filter(config.level))
}

/// Layer that only passes the file-sink notice, written to `writer`
///
/// Installed when neither the file nor the console layer is active, so a
/// failed sink is still reported.
pub fn sink_notice_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter_fn(|meta| meta.target() == SINK_NOTICE_TARGET))
}

fn warn_sink_unavailable(path: &std::path::Path, reason: &str) {
    warn!(
        target: SINK_NOTICE_TARGET,
        path = %path.display(),
        error = %reason,
        "Log file unavailable, continuing without file sink"
    );
}

/// Install the global subscriber
///
/// `console_filter` is the default directive of the console layer when
/// `RUST_LOG` is unset; it falls back to the file level.
///
/// # Errors
///
/// Returns [`TelemetryError::LogSink`] if the file cannot be opened and
/// `graceful_fallback` is off, or [`TelemetryError::Init`] if a global
/// subscriber is already installed.
pub fn init_logging(
    config: &LoggingConfig,
    console_filter: Option<&str>,
) -> Result<LogSinkStatus, TelemetryError> {
    let (file_layer, status) = match open_log_file(&config.path) {
        Ok(file) => (
            Some(json_layer(std::sync::Mutex::new(file), config)),
            LogSinkStatus::File(config.path.clone()),
        ),
        Err(source) if config.graceful_fallback => (
            None,
            LogSinkStatus::ConsoleOnly {
                reason: source.to_string(),
            },
        ),
        Err(source) => {
            return Err(TelemetryError::LogSink {
                path: config.path.display().to_string(),
                source,
            });
        },
    };

    let console_layer = config.console.then(|| {
        let directive = console_filter
            .map_or_else(|| level_filter(config.level).to_string(), str::to_string);
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter)
    });

    let notice_layer =
        (!config.console && !status.is_file()).then(|| sink_notice_layer(std::io::stderr));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(notice_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    match &status {
        LogSinkStatus::File(path) => {
            info!(path = %path.display(), level = %config.level, "Logging initialized");
        },
        LogSinkStatus::ConsoleOnly { reason } => warn_sink_unavailable(&config.path, reason),
    }

    Ok(status)
}
