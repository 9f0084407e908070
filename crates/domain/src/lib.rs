//! Domain layer for otel-docs
//!
//! Contains the telemetry vocabulary shared by every other crate: resource
//! attributes, span identity, severities and the correlated log record.
//! This layer has no telemetry SDK dependency.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
