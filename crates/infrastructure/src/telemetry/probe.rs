//! Collector reachability probe
//!
//! The tonic channel behind the OTLP exporters connects lazily, so an
//! unreachable collector is invisible at construction time. The probe opens
//! and immediately closes a TCP connection to the endpoint before the work
//! loop starts.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;
use url::{Host, Url};

use super::otel::TelemetryError;

/// Resolve an endpoint URL to a `host:port` string
///
/// Falls back to the scheme's default port when none is given.
pub fn collector_address(endpoint: &str) -> Result<String, TelemetryError> {
    let url = Url::parse(endpoint)
        .map_err(|e| TelemetryError::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;

    let port = url.port_or_known_default().ok_or_else(|| {
        TelemetryError::Config(format!("endpoint {endpoint:?} has no port"))
    })?;

    match url.host() {
        Some(Host::Domain(domain)) => Ok(format!("{domain}:{port}")),
        Some(Host::Ipv4(ip)) => Ok(format!("{ip}:{port}")),
        Some(Host::Ipv6(ip)) => Ok(format!("[{ip}]:{port}")),
        None => Err(TelemetryError::Config(format!(
            "endpoint {endpoint:?} has no host"
        ))),
    }
}

/// Check that the collector accepts TCP connections within `timeout`
pub async fn probe_endpoint(endpoint: &str, timeout: Duration) -> Result<(), TelemetryError> {
    let address = collector_address(endpoint)?;

    match tokio::time::timeout(timeout, TcpStream::connect(address.as_str())).await {
        Ok(Ok(_stream)) => {
            debug!(%address, "Collector endpoint reachable");
            Ok(())
        },
        Ok(Err(e)) => Err(TelemetryError::Exporter(format!(
            "collector unreachable at {endpoint}: {e}"
        ))),
        Err(_) => Err(TelemetryError::Exporter(format!(
            "timed out after {timeout:?} connecting to {endpoint}"
        ))),
    }
}
