//! Event log adapter
//!
//! Implements the application's [`EventLogPort`] by emitting `tracing`
//! events, which the subscriber routes to the JSON file sink and console.

use application::ports::EventLogPort;
use domain::{LogRecord, Severity};

/// Target of every correlated work record
pub const WORK_EVENT_TARGET: &str = "otel_docs::work";

/// [`EventLogPort`] that forwards records to the global `tracing` dispatcher
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventLog;

impl TracingEventLog {
    /// Create the adapter
    pub const fn new() -> Self {
        Self
    }
}

macro_rules! emit_record {
    ($level:expr, $record:expr, $trace_id:expr, $span_id:expr) => {
        tracing::event!(
            target: WORK_EVENT_TARGET,
            $level,
            service = $record.resource.service_name(),
            env = $record.resource.environment(),
            version = $record.resource.version(),
            source = $record.source.as_str(),
            trace_id = $trace_id,
            span_id = $span_id,
            iteration = $record.iteration,
            "{}",
            $record.message
        )
    };
}

impl EventLogPort for TracingEventLog {
    fn emit(&self, record: &LogRecord) {
        let trace_id = record.trace_id();
        let span_id = record.span_id();
        match record.severity {
            Severity::Trace => emit_record!(tracing::Level::TRACE, record, &trace_id, &span_id),
            Severity::Debug => emit_record!(tracing::Level::DEBUG, record, &trace_id, &span_id),
            Severity::Info => emit_record!(tracing::Level::INFO, record, &trace_id, &span_id),
            Severity::Warning => emit_record!(tracing::Level::WARN, record, &trace_id, &span_id),
            Severity::Error => emit_record!(tracing::Level::ERROR, record, &trace_id, &span_id),
        }
    }
}
