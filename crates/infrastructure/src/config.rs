//! Application configuration
//!
//! Layered from built-in defaults, an optional TOML file and `OTEL_DOCS_*`
//! environment variables, in increasing order of precedence.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use application::WorkLoopConfig;
use domain::ResourceAttributes;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;
use crate::telemetry::{TelemetryConfig, TelemetryError};

/// Prefix of overriding environment variables
pub const ENV_PREFIX: &str = "OTEL_DOCS";

/// Nesting separator of environment keys (`OTEL_DOCS_WORK__INTERVAL_SECS`)
pub const ENV_SEPARATOR: &str = "__";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config";

/// Service identity attached to every span, metric and log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// `service.name`
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// `deployment.environment`
    #[serde(default = "default_environment")]
    pub environment: String,

    /// `service.version`
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_service_name() -> String {
    "otel-docs".to_string()
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_version() -> String {
    "0.1".to_string()
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            version: default_version(),
        }
    }
}

/// Work loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkConfig {
    /// Pause between units of work in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Name of the span opened per unit
    #[serde(default = "default_span_name")]
    pub span_name: String,

    /// Message of the correlated log record
    #[serde(default = "default_message")]
    pub message: String,

    /// `source` field of the log record
    #[serde(default = "default_source")]
    pub source: String,

    /// Stop after this many units; run until a signal when unset
    #[serde(default)]
    pub max_iterations: Option<u64>,
}

const fn default_interval() -> u64 {
    5
}

fn default_span_name() -> String {
    "work".to_string()
}

fn default_message() -> String {
    "Did Work".to_string()
}

fn default_source() -> String {
    "app".to_string()
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            span_name: default_span_name(),
            message: default_message(),
            source: default_source(),
            max_iterations: None,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service identity
    #[serde(default)]
    pub resource: ResourceConfig,

    /// OTLP pipelines
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Log sink
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Work loop
    #[serde(default)]
    pub work: WorkConfig,
}

impl AppConfig {
    /// Load configuration from an optional file and the process environment
    ///
    /// With `path` set the file must exist; otherwise `config.toml` in the
    /// working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_from(path, None)
    }

    /// Load configuration reading environment overrides from `env` instead
    /// of the process environment when given
    pub fn load_from(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            // e.g. OTEL_DOCS_TELEMETRY__ENDPOINT. Values stay text until
            // deserialization so `RESOURCE__VERSION=1.0` is kept verbatim.
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .source(env),
            );

        builder.build()?.try_deserialize()
    }

    /// Validated service identity
    pub fn resource_attributes(&self) -> Result<ResourceAttributes, TelemetryError> {
        ResourceAttributes::new(
            self.resource.service_name.as_str(),
            self.resource.environment.as_str(),
            self.resource.version.as_str(),
        )
        .map_err(|e| TelemetryError::Config(e.to_string()))
    }

    /// Work loop settings for the application service
    pub fn work_loop_config(&self) -> WorkLoopConfig {
        WorkLoopConfig {
            interval: Duration::from_secs(self.work.interval_secs),
            span_name: self.work.span_name.clone(),
            message: self.work.message.clone(),
            source: self.work.source.clone(),
            max_iterations: self.work.max_iterations,
        }
    }
}
