//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A required resource attribute is missing or blank
    #[error("Missing resource attribute: {0}")]
    MissingAttribute(&'static str),

    /// Severity name not recognized
    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    /// Trace or span identifier is malformed or all zero
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}
