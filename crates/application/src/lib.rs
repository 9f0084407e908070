//! Application layer - Use cases and orchestration
//!
//! Defines the ports the work loop emits through and the work loop itself.
//! Adapters in the infrastructure layer bind the ports to OpenTelemetry and
//! the JSON log sink.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
