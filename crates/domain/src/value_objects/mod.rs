//! Value Objects - Immutable, identity-less domain primitives

mod resource_attributes;
mod severity;
mod span_identity;

pub use resource_attributes::{
    DEPLOYMENT_ENVIRONMENT, ResourceAttributes, SERVICE_NAME, SERVICE_VERSION,
};
pub use severity::Severity;
pub use span_identity::{SpanContext, SpanId, TraceId};
