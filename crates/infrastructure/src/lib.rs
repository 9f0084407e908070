//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of OpenTelemetry (spans and the
//! work counter, exported over OTLP/gRPC) and `tracing` (the JSON log sink),
//! and loads the layered application configuration.

pub mod config;
pub mod logging;
pub mod telemetry;

pub use config::{AppConfig, ResourceConfig, WorkConfig};
pub use logging::{LogSinkStatus, LoggingConfig, TracingEventLog, init_logging};
pub use telemetry::{
    OtelCounterAdapter, OtelTraceAdapter, TelemetryConfig, TelemetryError, TelemetryGuard,
    TelemetryPipeline, init_telemetry,
};
