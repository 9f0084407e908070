//! JSON-lines event formatter
//!
//! Writes one object per event with `time`, `level` and `msg` keys plus
//! every structured field of the event, keys sorted. A field that collides
//! with one of the three reserved keys is kept under a `fields.` prefix.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Local;
use domain::Severity;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Default timestamp layout, e.g. `2024-05-01T12:00:00+0000`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

const TIME_KEY: &str = "time";
const LEVEL_KEY: &str = "level";
const MSG_KEY: &str = "msg";

/// Formats events as single-line JSON objects
#[derive(Debug, Clone)]
pub struct JsonLines {
    timestamp_format: String,
}

impl Default for JsonLines {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl JsonLines {
    /// Create a formatter with a `chrono` strftime timestamp layout
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }

    fn record(&self, event: &Event<'_>) -> BTreeMap<String, Value> {
        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let mut record = BTreeMap::new();
        for (key, value) in visitor.fields {
            let key = if matches!(key.as_str(), TIME_KEY | LEVEL_KEY | MSG_KEY) {
                format!("fields.{key}")
            } else {
                key
            };
            record.insert(key, value);
        }

        record.insert(
            TIME_KEY.to_string(),
            Value::String(Local::now().format(&self.timestamp_format).to_string()),
        );
        record.insert(
            LEVEL_KEY.to_string(),
            Value::String(severity_of(*event.metadata().level()).as_str().to_string()),
        );
        record.insert(
            MSG_KEY.to_string(),
            Value::String(visitor.message.unwrap_or_default()),
        );
        record
    }
}

impl<S, N> FormatEvent<S, N> for JsonLines
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let line = serde_json::to_string(&self.record(event)).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Map a tracing level onto the record severity
pub fn severity_of(level: Level) -> Severity {
    match level {
        Level::TRACE => Severity::Trace,
        Level::DEBUG => Severity::Debug,
        Level::INFO => Severity::Info,
        Level::WARN => Severity::Warning,
        Level::ERROR => Severity::Error,
    }
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, Value)>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}
