//! Counter port
//!
//! A monotonic counter instrument. Increments are fire-and-forget: the
//! backing SDK aggregates them and exports on its own schedule.

#[cfg(test)]
use mockall::automock;

/// Port for a monotonic counter
#[cfg_attr(test, automock)]
pub trait CounterPort: Send + Sync {
    /// Add `delta` to the counter
    fn add(&self, delta: u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn CounterPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn CounterPort>();
    }

    #[test]
    fn mock_records_delta() {
        let mut mock = MockCounterPort::new();
        mock.expect_add().withf(|delta| *delta == 1).times(2).return_const(());
        mock.add(1);
        mock.add(1);
    }
}
