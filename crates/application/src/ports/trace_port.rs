//! Trace port
//!
//! Starts named spans. A started span is represented by a [`SpanGuard`] that
//! must be ended exactly once; ending consumes the guard so a span cannot be
//! ended twice.

use domain::SpanContext;
#[cfg(test)]
use mockall::automock;

/// An open span
pub trait SpanGuard: Send {
    /// Identity of the open span
    fn context(&self) -> SpanContext;

    /// Mark the span complete and hand it to the exporter
    fn end(self: Box<Self>);
}

/// Port for starting spans
#[cfg_attr(test, automock)]
pub trait TracePort: Send + Sync {
    /// Start a new root span with fresh trace and span ids
    fn start_span(&self, name: &str) -> Box<dyn SpanGuard>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn TracePort, _: &dyn SpanGuard) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn TracePort>();
    }
}
