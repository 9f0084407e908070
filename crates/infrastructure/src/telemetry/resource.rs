//! OpenTelemetry resource construction

use domain::{DEPLOYMENT_ENVIRONMENT, ResourceAttributes, SERVICE_VERSION};
use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

/// Build the resource attached to every span and metric
///
/// Carries `service.name`, `deployment.environment` and `service.version`
/// alongside the SDK's own `telemetry.sdk.*` attributes.
pub fn build_resource(attributes: &ResourceAttributes) -> Resource {
    Resource::builder()
        .with_service_name(attributes.service_name().to_string())
        .with_attributes([
            KeyValue::new(DEPLOYMENT_ENVIRONMENT, attributes.environment().to_string()),
            KeyValue::new(SERVICE_VERSION, attributes.version().to_string()),
        ])
        .build()
}
