//! Event log port
//!
//! Writes correlated log records. Records are emitted synchronously and are
//! not buffered by this layer; a failed write is dropped.

use domain::LogRecord;
#[cfg(test)]
use mockall::automock;

/// Port for emitting structured log records
#[cfg_attr(test, automock)]
pub trait EventLogPort: Send + Sync {
    /// Emit one record
    fn emit(&self, record: &LogRecord);
}
