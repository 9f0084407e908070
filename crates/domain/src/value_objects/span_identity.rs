//! Trace and span identifiers
//!
//! Rendered as lowercase hex, the same form used by W3C trace-context
//! headers and OTLP exporters, so a `trace_id` written to the log sink can be
//! looked up directly in a tracing backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Exactly `len` characters of `[0-9a-f]`
fn is_lower_hex(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// 128-bit trace identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TraceId(u128);

impl TraceId {
    /// Wrap raw big-endian bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    /// Raw big-endian bytes
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// All-zero ids are never assigned to a sampled span
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_lower_hex(s, 32) {
            return Err(DomainError::InvalidIdentifier(s.to_string()));
        }
        let value =
            u128::from_str_radix(s, 16).map_err(|_| DomainError::InvalidIdentifier(s.to_string()))?;
        let id = Self(value);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(DomainError::InvalidIdentifier(s.to_string()))
        }
    }
}

impl From<TraceId> for String {
    fn from(id: TraceId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for TraceId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 64-bit span identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SpanId(u64);

impl SpanId {
    /// Wrap raw big-endian bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// Raw big-endian bytes
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// All-zero ids are invalid
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SpanId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_lower_hex(s, 16) {
            return Err(DomainError::InvalidIdentifier(s.to_string()));
        }
        let value =
            u64::from_str_radix(s, 16).map_err(|_| DomainError::InvalidIdentifier(s.to_string()))?;
        let id = Self(value);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(DomainError::InvalidIdentifier(s.to_string()))
        }
    }
}

impl From<SpanId> for String {
    fn from(id: SpanId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SpanId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Identity of one span within its trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpanContext {
    /// Trace the span belongs to
    pub trace_id: TraceId,
    /// The span itself
    pub span_id: SpanId,
}

impl SpanContext {
    /// Create a span context from its two identifiers
    #[must_use]
    pub const fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self { trace_id, span_id }
    }

    /// Both identifiers are non-zero
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.trace_id.is_valid() && self.span_id.is_valid()
    }
}
