//! Trace emitter
//!
//! Batching tracer provider plus the adapter that implements the
//! application's [`TracePort`] on top of an SDK tracer.

use application::ports::{SpanGuard, TracePort};
use domain::{SpanContext, SpanId, TraceId};
use opentelemetry::Context;
use opentelemetry::trace::{Span as _, Tracer as _, TracerProvider as _};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{
    BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider, Span, SpanExporter,
};

use super::otel::TelemetryConfig;

/// Build a tracer provider exporting through a batch span processor
pub fn build_tracer_provider<E>(
    exporter: E,
    resource: Resource,
    config: &TelemetryConfig,
) -> SdkTracerProvider
where
    E: SpanExporter + 'static,
{
    let batch_config = BatchConfigBuilder::default()
        .with_max_queue_size(config.max_queue_size)
        .with_max_export_batch_size(config.max_export_batch_size)
        .with_scheduled_delay(config.scheduled_delay())
        .build();

    let processor = BatchSpanProcessor::builder(exporter)
        .with_batch_config(batch_config)
        .build();

    SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_resource(resource)
        .build()
}

/// [`TracePort`] backed by an OpenTelemetry SDK tracer
#[derive(Clone)]
pub struct OtelTraceAdapter {
    tracer: SdkTracer,
}

impl std::fmt::Debug for OtelTraceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelTraceAdapter").finish_non_exhaustive()
    }
}

impl OtelTraceAdapter {
    /// Obtain a tracer with the given instrumentation scope name
    pub fn new(provider: &SdkTracerProvider, name: &str) -> Self {
        Self {
            tracer: provider.tracer(name.to_string()),
        }
    }
}

impl TracePort for OtelTraceAdapter {
    fn start_span(&self, name: &str) -> Box<dyn SpanGuard> {
        // An empty parent context forces a new root span and trace id.
        let span = self
            .tracer
            .start_with_context(name.to_string(), &Context::new());
        Box::new(OtelSpanGuard { span })
    }
}

/// An open SDK span
pub struct OtelSpanGuard {
    span: Span,
}

impl std::fmt::Debug for OtelSpanGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelSpanGuard")
            .field("span_context", self.span.span_context())
            .finish()
    }
}

impl SpanGuard for OtelSpanGuard {
    fn context(&self) -> SpanContext {
        let otel = self.span.span_context();
        SpanContext::new(
            TraceId::from_bytes(otel.trace_id().to_bytes()),
            SpanId::from_bytes(otel.span_id().to_bytes()),
        )
    }

    fn end(mut self: Box<Self>) {
        self.span.end();
    }
}
