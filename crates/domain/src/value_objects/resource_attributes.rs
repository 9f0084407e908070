//! Resource attributes value object
//!
//! The static identity attached to every span, log record and metric emitted
//! by the process.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Semantic-convention key for the service name
pub const SERVICE_NAME: &str = "service.name";

/// Semantic-convention key for the deployment environment
pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

/// Semantic-convention key for the service version
pub const SERVICE_VERSION: &str = "service.version";

/// Immutable service identity: name, environment and version
///
/// Built once at startup. Every field is guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAttributes", into = "RawAttributes")]
pub struct ResourceAttributes {
    service_name: String,
    environment: String,
    version: String,
}

impl ResourceAttributes {
    /// Create resource attributes, rejecting missing or blank values
    pub fn new(
        service_name: impl Into<String>,
        environment: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            service_name: required(SERVICE_NAME, service_name.into())?,
            environment: required(DEPLOYMENT_ENVIRONMENT, environment.into())?,
            version: required(SERVICE_VERSION, version.into())?,
        })
    }

    /// Build from optional parts, as read from configuration
    pub fn from_parts(
        service_name: Option<String>,
        environment: Option<String>,
        version: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::new(
            service_name.ok_or(DomainError::MissingAttribute(SERVICE_NAME))?,
            environment.ok_or(DomainError::MissingAttribute(DEPLOYMENT_ENVIRONMENT))?,
            version.ok_or(DomainError::MissingAttribute(SERVICE_VERSION))?,
        )
    }

    /// Service name (`service.name`)
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Deployment environment (`deployment.environment`)
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Service version (`service.version`)
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Key/value pairs in semantic-convention form
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (SERVICE_NAME, self.service_name.as_str()),
            (DEPLOYMENT_ENVIRONMENT, self.environment.as_str()),
            (SERVICE_VERSION, self.version.as_str()),
        ]
    }
}

fn required(key: &'static str, value: String) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MissingAttribute(key));
    }
    Ok(trimmed.to_string())
}

impl fmt::Display for ResourceAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} ({})",
            self.service_name, self.version, self.environment
        )
    }
}

#[derive(Serialize, Deserialize)]
struct RawAttributes {
    service_name: Option<String>,
    environment: Option<String>,
    version: Option<String>,
}

impl TryFrom<RawAttributes> for ResourceAttributes {
    type Error = DomainError;

    fn try_from(raw: RawAttributes) -> Result<Self, Self::Error> {
        Self::from_parts(raw.service_name, raw.environment, raw.version)
    }
}

impl From<ResourceAttributes> for RawAttributes {
    fn from(attrs: ResourceAttributes) -> Self {
        Self {
            service_name: Some(attrs.service_name),
            environment: Some(attrs.environment),
            version: Some(attrs.version),
        }
    }
}
