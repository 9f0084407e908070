//! Context propagation
//!
//! W3C trace-context and baggage, combined into a single text-map
//! propagator for outbound carriers.

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

/// Composite propagator writing `traceparent`, `tracestate` and `baggage`
pub fn composite_propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// Install the composite propagator as the global text-map propagator
pub fn install_propagator() {
    global::set_text_map_propagator(composite_propagator());
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use opentelemetry::baggage::BaggageExt;
    use opentelemetry::propagation::TextMapPropagator;
    use opentelemetry::trace::{Span, TraceContextExt, Tracer, TracerProvider};
    use opentelemetry::{Context, KeyValue};
    use opentelemetry_sdk::trace::SdkTracerProvider;

    use super::*;

    #[test]
    fn declares_trace_context_and_baggage_fields() {
        let propagator = composite_propagator();
        let fields: Vec<&str> = propagator.fields().collect();
        assert!(fields.contains(&"traceparent"));
        assert!(fields.contains(&"tracestate"));
        assert!(fields.contains(&"baggage"));
    }

    #[test]
    fn injects_traceparent_and_baggage() {
        let provider = SdkTracerProvider::builder().build();
        let tracer = provider.tracer("propagation-test");
        let span = tracer.start("outbound");
        let trace_id = span.span_context().trace_id();

        let cx = Context::current_with_span(span)
            .with_baggage(vec![KeyValue::new("tenant", "docs")]);

        let mut carrier: HashMap<String, String> = HashMap::new();
        composite_propagator().inject_context(&cx, &mut carrier);

        let traceparent = carrier.get("traceparent").unwrap();
        assert!(traceparent.starts_with(&format!("00-{trace_id}-")));
        assert_eq!(carrier.get("baggage").map(String::as_str), Some("tenant=docs"));
    }

    #[test]
    fn extract_round_trips_span_context() {
        let provider = SdkTracerProvider::builder().build();
        let tracer = provider.tracer("propagation-test");
        let span = tracer.start("outbound");
        let expected = span.span_context().clone();
        let cx = Context::current_with_span(span);

        let propagator = composite_propagator();
        let mut carrier: HashMap<String, String> = HashMap::new();
        propagator.inject_context(&cx, &mut carrier);

        let extracted = propagator.extract(&carrier);
        let remote = extracted.span().span_context().clone();
        assert_eq!(remote.trace_id(), expected.trace_id());
        assert_eq!(remote.span_id(), expected.span_id());
        assert!(remote.is_remote());
    }
}
