//! Prometheus metrics setup and domain metric helpers.
//!
//! Configuration comes from the environment:
//!
//! - `METRICS_ENABLED`: `true` (default) or `false`
//! - `METRICS_PATH`: scrape endpoint path (default `/metrics`)

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Metrics configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether the Prometheus recorder is installed at all.
    pub enabled: bool,
    /// Path the service exposes the scrape endpoint on.
    pub path: String,
}

impl MetricsConfig {
    /// Read configuration from `METRICS_ENABLED` and `METRICS_PATH`.
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|value| parse_enabled(&value))
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());

        Self { enabled, path }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

fn parse_enabled(value: &str) -> bool {
    !matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "off")
}

/// Errors from metrics initialization.
#[derive(Debug)]
pub enum MetricsError {
    /// `init_metrics` was called more than once.
    AlreadyInitialized,
    /// The Prometheus recorder could not be installed.
    InstallFailed(String),
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            Self::InstallFailed(message) => {
                write!(f, "failed to install metrics recorder: {message}")
            }
        }
    }
}

impl std::error::Error for MetricsError {}

/// Install the global Prometheus recorder.
///
/// A no-op when metrics are disabled via configuration.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| MetricsError::InstallFailed(err.to_string()))?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Render the current metrics in Prometheus exposition format.
///
/// Usable directly as an axum handler for `GET /metrics`.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

/// Record the start of a search session.
pub fn record_search_started(algorithm: &str, graph_id: &str) {
    metrics::counter!(
        "pathscope_searches_started_total",
        "algorithm" => algorithm.to_string(),
        "graph" => graph_id.to_string()
    )
    .increment(1);
}

/// Record a search session reaching a terminal status.
pub fn record_search_finished(algorithm: &str, status: &str, steps: usize) {
    metrics::counter!(
        "pathscope_searches_finished_total",
        "algorithm" => algorithm.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "pathscope_search_steps",
        "algorithm" => algorithm.to_string()
    )
    .record(steps as f64);
}

/// Record step events served to clients through the paging endpoint.
pub fn record_steps_served(count: usize) {
    metrics::counter!("pathscope_steps_served_total").increment(count as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn parses_enabled_values() {
        assert!(parse_enabled("true"));
        assert!(parse_enabled("1"));
        assert!(parse_enabled("yes"));
        assert!(!parse_enabled("false"));
        assert!(!parse_enabled("FALSE"));
        assert!(!parse_enabled("0"));
        assert!(!parse_enabled("off"));
    }

    #[tokio::test]
    async fn handler_reports_uninitialized_recorder() {
        assert_eq!(metrics_handler().await, "# Metrics not initialized\n");
    }

    #[tokio::test]
    async fn disabled_config_skips_install() {
        let config = MetricsConfig {
            enabled: false,
            path: "/metrics".to_string(),
        };
        assert!(init_metrics(&config).is_ok());
        assert_eq!(metrics_handler().await, "# Metrics not initialized\n");
    }

    #[test]
    fn error_display() {
        assert_eq!(
            MetricsError::AlreadyInitialized.to_string(),
            "metrics recorder already initialized"
        );
        assert!(MetricsError::InstallFailed("boom".to_string())
            .to_string()
            .contains("boom"));
    }
}
