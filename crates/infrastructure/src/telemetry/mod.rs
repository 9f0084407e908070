//! Telemetry and distributed tracing infrastructure
//!
//! Provides the OpenTelemetry trace and metric pipelines exporting over
//! OTLP/gRPC, and the adapters that bind them to the application ports.

mod meter;
mod otel;
mod probe;
mod propagation;
mod resource;
mod tracer;

pub use meter::{OtelCounterAdapter, build_meter_provider, validate_instrument_name};
pub use otel::{TelemetryConfig, TelemetryError, TelemetryGuard, TelemetryPipeline, init_telemetry};
pub use probe::{collector_address, probe_endpoint};
pub use propagation::{composite_propagator, install_propagator};
pub use resource::build_resource;
pub use tracer::{OtelSpanGuard, OtelTraceAdapter, build_tracer_provider};
