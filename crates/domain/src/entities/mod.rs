//! Domain entities - Objects with identity and lifecycle

mod log_record;

pub use log_record::LogRecord;
