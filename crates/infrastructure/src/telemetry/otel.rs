//! OpenTelemetry initialization and configuration
//!
//! Builds the trace and metric pipelines exporting to an OTLP/gRPC collector
//! and owns their providers for the lifetime of the process. Construction
//! failures are fatal; there is no console-only fallback for exporters.

use std::sync::Arc;
use std::time::Duration;

use domain::ResourceAttributes;
use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::trace::{SdkTracerProvider, SpanExporter};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::meter::{OtelCounterAdapter, build_meter_provider};
use super::probe::probe_endpoint;
use super::propagation::install_propagator;
use super::resource::build_resource;
use super::tracer::{OtelTraceAdapter, build_tracer_provider};

/// Configuration for the OTLP trace and metric pipelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint URL (e.g., "http://localhost:4317")
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-export timeout in seconds
    #[serde(default = "default_export_timeout")]
    pub export_timeout_secs: u64,

    /// Interval between metric exports in seconds
    #[serde(default = "default_metric_interval")]
    pub metric_interval_secs: u64,

    /// Spans buffered before new ones are dropped
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Maximum spans per export request
    #[serde(default = "default_max_export_batch_size")]
    pub max_export_batch_size: usize,

    /// Delay between scheduled span batch exports in milliseconds
    #[serde(default = "default_scheduled_delay")]
    pub scheduled_delay_ms: u64,

    /// Instrumentation scope name of the tracer
    #[serde(default = "default_tracer_name")]
    pub tracer_name: String,

    /// Instrumentation scope name of the meter
    #[serde(default = "default_meter_name")]
    pub meter_name: String,

    /// Name of the work counter instrument
    #[serde(default = "default_counter_name")]
    pub counter_name: String,

    /// Whether to check that the collector accepts TCP connections at startup
    ///
    /// The gRPC channel connects lazily, so without the probe an unreachable
    /// collector only shows up as failed background exports.
    #[serde(default = "default_true")]
    pub probe_endpoint: bool,

    /// Connect timeout of the startup probe in milliseconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Deadline for flushing both providers at shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:4317".to_string()
}

const fn default_export_timeout() -> u64 {
    10
}

const fn default_metric_interval() -> u64 {
    60
}

const fn default_max_queue_size() -> usize {
    2048
}

const fn default_max_export_batch_size() -> usize {
    512
}

const fn default_scheduled_delay() -> u64 {
    5000
}

fn default_tracer_name() -> String {
    "client-tracer".to_string()
}

fn default_meter_name() -> String {
    "otel-docs".to_string()
}

fn default_counter_name() -> String {
    "otel.docs.custom.metric".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_probe_timeout() -> u64 {
    2000
}

const fn default_shutdown_timeout() -> u64 {
    5
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            export_timeout_secs: default_export_timeout(),
            metric_interval_secs: default_metric_interval(),
            max_queue_size: default_max_queue_size(),
            max_export_batch_size: default_max_export_batch_size(),
            scheduled_delay_ms: default_scheduled_delay(),
            tracer_name: default_tracer_name(),
            meter_name: default_meter_name(),
            counter_name: default_counter_name(),
            probe_endpoint: true,
            probe_timeout_ms: default_probe_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl TelemetryConfig {
    /// Per-export timeout
    pub const fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_secs)
    }

    /// Metric export interval
    pub const fn metric_interval(&self) -> Duration {
        Duration::from_secs(self.metric_interval_secs)
    }

    /// Span batch scheduling delay
    pub const fn scheduled_delay(&self) -> Duration {
        Duration::from_millis(self.scheduled_delay_ms)
    }

    /// Startup probe timeout
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Shutdown flush deadline
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Owns the tracer and meter providers
///
/// Call [`TelemetryGuard::shutdown`] to flush within a deadline. If the guard
/// is dropped without that, providers are shut down best-effort on drop.
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
}

impl std::fmt::Debug for TelemetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryGuard")
            .field("tracing", &self.tracer_provider.is_some())
            .field("metrics", &self.meter_provider.is_some())
            .finish_non_exhaustive()
    }
}

impl TelemetryGuard {
    /// Wrap already-built providers
    pub const fn new(tracer_provider: SdkTracerProvider, meter_provider: SdkMeterProvider) -> Self {
        Self {
            tracer_provider: Some(tracer_provider),
            meter_provider: Some(meter_provider),
        }
    }

    /// Whether the providers are still active
    pub const fn is_active(&self) -> bool {
        self.tracer_provider.is_some() || self.meter_provider.is_some()
    }

    /// Export everything buffered so far without shutting down
    pub fn force_flush(&self) -> Result<(), TelemetryError> {
        if let Some(provider) = &self.tracer_provider {
            provider
                .force_flush()
                .map_err(|e| TelemetryError::Flush(format!("tracer provider: {e}")))?;
        }
        if let Some(provider) = &self.meter_provider {
            provider
                .force_flush()
                .map_err(|e| TelemetryError::Flush(format!("meter provider: {e}")))?;
        }
        Ok(())
    }

    /// Flush and shut down both providers within `deadline`
    ///
    /// Flushing blocks on the exporters, so it runs on the blocking pool.
    pub async fn shutdown(mut self, deadline: Duration) -> Result<(), TelemetryError> {
        let tracer_provider = self.tracer_provider.take();
        let meter_provider = self.meter_provider.take();

        let task = tokio::task::spawn_blocking(move || {
            let mut failures = Vec::new();
            if let Some(provider) = tracer_provider {
                if let Err(e) = provider.shutdown() {
                    failures.push(format!("tracer provider: {e}"));
                }
            }
            if let Some(provider) = meter_provider {
                if let Err(e) = provider.shutdown() {
                    failures.push(format!("meter provider: {e}"));
                }
            }
            failures
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(failures)) if failures.is_empty() => {
                info!("Telemetry providers flushed and shut down");
                Ok(())
            },
            Ok(Ok(failures)) => Err(TelemetryError::Shutdown(failures.join("; "))),
            Ok(Err(join_error)) => Err(TelemetryError::Shutdown(join_error.to_string())),
            Err(_) => Err(TelemetryError::Shutdown(format!(
                "flush did not complete within {deadline:?}"
            ))),
        }
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                error!("Failed to shutdown tracer provider: {:?}", e);
            }
        }
        if let Some(provider) = self.meter_provider.take() {
            if let Err(e) = provider.shutdown() {
                error!("Failed to shutdown meter provider: {:?}", e);
            }
        }
    }
}

/// Trace and metric emitters plus the guard that owns their providers
#[derive(Debug)]
pub struct TelemetryPipeline {
    /// Starts spans on the configured tracer
    pub tracer: Arc<OtelTraceAdapter>,
    /// Increments the work counter
    pub counter: Arc<OtelCounterAdapter>,
    /// Provider lifecycle
    pub guard: TelemetryGuard,
}

impl TelemetryPipeline {
    /// Assemble a pipeline over arbitrary exporters
    ///
    /// Used by [`init_telemetry`] with OTLP exporters and by tests with
    /// in-memory ones. Does not touch global state.
    pub fn from_exporters<S, M>(
        span_exporter: S,
        metric_exporter: M,
        resource: &ResourceAttributes,
        config: &TelemetryConfig,
    ) -> Result<Self, TelemetryError>
    where
        S: SpanExporter + 'static,
        M: PushMetricExporter + 'static,
    {
        let resource = build_resource(resource);

        let tracer_provider = build_tracer_provider(span_exporter, resource.clone(), config);
        let meter_provider = build_meter_provider(metric_exporter, resource, config);

        let tracer = OtelTraceAdapter::new(&tracer_provider, &config.tracer_name);
        let counter = OtelCounterAdapter::new(&meter_provider, config)?;

        Ok(Self {
            tracer: Arc::new(tracer),
            counter: Arc::new(counter),
            guard: TelemetryGuard::new(tracer_provider, meter_provider),
        })
    }
}

/// Initialize the OTLP trace and metric pipelines
///
/// Probes the collector (unless disabled), builds gRPC exporters, and
/// installs the tracer provider, meter provider and composite propagator
/// globally. Must be called from within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let resource = domain::ResourceAttributes::new("otel-docs", "dev", "0.1")?;
///     let pipeline = init_telemetry(&TelemetryConfig::default(), &resource).await?;
///
///     // Application code...
///
///     pipeline.guard.shutdown(std::time::Duration::from_secs(5)).await?;
///     Ok(())
/// }
/// ```
pub async fn init_telemetry(
    config: &TelemetryConfig,
    resource: &ResourceAttributes,
) -> Result<TelemetryPipeline, TelemetryError> {
    if config.probe_endpoint {
        probe_endpoint(&config.endpoint, config.probe_timeout()).await?;
    }

    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_timeout(config.export_timeout())
        .build()
        .map_err(|e| TelemetryError::Exporter(format!("span exporter: {e}")))?;

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .with_timeout(config.export_timeout())
        .build()
        .map_err(|e| TelemetryError::Exporter(format!("metric exporter: {e}")))?;

    let pipeline =
        TelemetryPipeline::from_exporters(span_exporter, metric_exporter, resource, config)?;

    if let Some(provider) = &pipeline.guard.tracer_provider {
        global::set_tracer_provider(provider.clone());
    }
    if let Some(provider) = &pipeline.guard.meter_provider {
        global::set_meter_provider(provider.clone());
    }
    install_propagator();

    info!(
        endpoint = %config.endpoint,
        service = %resource.service_name(),
        environment = %resource.environment(),
        version = %resource.version(),
        "Telemetry initialized with OTLP export"
    );

    Ok(pipeline)
}

/// Error type for telemetry and logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to create an OTLP exporter or reach the collector
    #[error("Failed to create OTLP exporter: {0}")]
    Exporter(String),

    /// Failed to register a metric instrument
    #[error("Failed to register instrument: {0}")]
    Instrument(String),

    /// Failed to open the log file sink
    #[error("Failed to open log sink {path}: {source}")]
    LogSink {
        /// Path that could not be opened
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to initialize the tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),

    /// Failed to export buffered telemetry
    #[error("Failed to flush telemetry: {0}")]
    Flush(String),

    /// Failed to flush and shut down the providers
    #[error("Failed to shut down telemetry: {0}")]
    Shutdown(String),
}
