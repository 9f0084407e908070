//! Port definitions for application layer
//!
//! Ports are interfaces that define how the work loop emits telemetry.
//! Adapters in the infrastructure layer implement these ports.

mod counter_port;
mod event_log_port;
mod trace_port;

#[cfg(test)]
pub use counter_port::MockCounterPort;
pub use counter_port::CounterPort;
#[cfg(test)]
pub use event_log_port::MockEventLogPort;
pub use event_log_port::EventLogPort;
#[cfg(test)]
pub use trace_port::MockTracePort;
pub use trace_port::{SpanGuard, TracePort};
