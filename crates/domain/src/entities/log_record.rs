//! Correlated log record
//!
//! One record is emitted per unit of work. It carries the identity of the
//! span that was open when it was written, so logs and traces can be joined
//! on `trace_id`.

use serde::{Deserialize, Serialize};

use crate::value_objects::{ResourceAttributes, Severity, SpanContext};

/// A structured log event correlated with a span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Record severity
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Span open while the record was produced
    pub span: SpanContext,
    /// Service identity (`service`, `env`, `version` fields)
    pub resource: ResourceAttributes,
    /// Emitting subsystem (`source` field)
    pub source: String,
    /// Sequence number of the unit of work, starting at 1
    pub iteration: u64,
}

impl LogRecord {
    /// Create an info-level record for the given span
    pub fn info(
        message: impl Into<String>,
        span: SpanContext,
        resource: ResourceAttributes,
    ) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            span,
            resource,
            source: String::new(),
            iteration: 0,
        }
    }

    /// Set the severity
    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the `source` field
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the iteration number
    #[must_use]
    pub const fn with_iteration(mut self, iteration: u64) -> Self {
        self.iteration = iteration;
        self
    }

    /// Trace id rendered for the `trace_id` field
    pub fn trace_id(&self) -> String {
        self.span.trace_id.to_string()
    }

    /// Span id rendered for the `span_id` field
    pub fn span_id(&self) -> String {
        self.span.span_id.to_string()
    }
}
