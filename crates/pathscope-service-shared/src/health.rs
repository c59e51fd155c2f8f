//! Health status payloads for Kubernetes probes.
//!
//! Service binaries build these from their own `CARGO_PKG_NAME` and
//! `CARGO_PKG_VERSION`, so the reported service name matches the binary
//! rather than this shared crate.

use serde::{Deserialize, Serialize};

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    /// Service name for identification.
    pub service: String,

    /// Service version from build-time.
    pub version: String,

    /// Number of graphs loaded (for readiness check).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graphs_loaded: Option<usize>,

    /// Number of search sessions currently held (for readiness check).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sessions: Option<usize>,
}

impl HealthStatus {
    /// Create a healthy liveness status.
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            graphs_loaded: None,
            active_sessions: None,
        }
    }

    /// Create a ready status with graph and session counts.
    pub fn ready(service: &str, version: &str, graphs: usize, sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            graphs_loaded: Some(graphs),
            active_sessions: Some(sessions),
        }
    }

    /// Create a not-ready status.
    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            graphs_loaded: None,
            active_sessions: None,
        }
    }
}
