//! Metric emitter
//!
//! Periodic-reader meter provider plus the counter adapter that implements
//! the application's [`CounterPort`].

use application::ports::CounterPort;
use opentelemetry::InstrumentationScope;
use opentelemetry::metrics::{Counter, MeterProvider as _};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};

use super::otel::{TelemetryConfig, TelemetryError};

/// Longest instrument name the OpenTelemetry API accepts
const MAX_INSTRUMENT_NAME_LEN: usize = 255;

/// Build a meter provider that pushes to `exporter` on a fixed interval
pub fn build_meter_provider<E>(
    exporter: E,
    resource: Resource,
    config: &TelemetryConfig,
) -> SdkMeterProvider
where
    E: PushMetricExporter + 'static,
{
    let reader = PeriodicReader::builder(exporter)
        .with_interval(config.metric_interval())
        .build();

    SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build()
}

/// Check an instrument name against the OpenTelemetry naming rules
///
/// A name starts with an ASCII letter, is at most 255 characters, and
/// contains only ASCII alphanumerics, `_`, `.`, `-` and `/`. The SDK silently
/// swaps invalid instruments for no-ops, so the check runs up front.
pub fn validate_instrument_name(name: &str) -> Result<(), TelemetryError> {
    let mut chars = name.chars();
    match chars.next() {
        None => {
            return Err(TelemetryError::Instrument(
                "instrument name must not be empty".to_string(),
            ));
        },
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(TelemetryError::Instrument(format!(
                "instrument name {name:?} must start with a letter"
            )));
        },
        Some(_) => {},
    }

    if name.len() > MAX_INSTRUMENT_NAME_LEN {
        return Err(TelemetryError::Instrument(format!(
            "instrument name exceeds {MAX_INSTRUMENT_NAME_LEN} characters"
        )));
    }

    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || "_.-/".contains(*c))) {
        return Err(TelemetryError::Instrument(format!(
            "instrument name {name:?} contains invalid character {bad:?}"
        )));
    }

    Ok(())
}

/// [`CounterPort`] backed by an OpenTelemetry `u64` counter
#[derive(Clone)]
pub struct OtelCounterAdapter {
    name: String,
    counter: Counter<u64>,
}

impl std::fmt::Debug for OtelCounterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtelCounterAdapter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OtelCounterAdapter {
    /// Register the work counter on a meter named by `config.meter_name`
    pub fn new(provider: &SdkMeterProvider, config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        validate_instrument_name(&config.counter_name)?;

        let scope = InstrumentationScope::builder(config.meter_name.clone()).build();
        let meter = provider.meter_with_scope(scope);
        let counter = meter
            .u64_counter(config.counter_name.clone())
            .with_description("Units of work completed")
            .build();

        Ok(Self {
            name: config.counter_name.clone(),
            counter,
        })
    }

    /// Instrument name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CounterPort for OtelCounterAdapter {
    fn add(&self, delta: u64) {
        self.counter.add(delta, &[]);
    }
}
