//! Structured logging setup shared by service binaries.
//!
//! Configuration comes from the environment:
//!
//! - `LOG_FORMAT`: `json` (default), `text`, or `pretty`
//! - `RUST_LOG`: tracing filter directives (default `info`)
//! - `SERVICE_NAME`: logical service name included in startup logs

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Newline-delimited JSON, one object per event.
    Json,
    /// Compact single-line text.
    Text,
    /// Multi-line human-readable output for local development.
    Pretty,
}

impl LogFormat {
    /// Parse a format name, falling back to JSON for unknown values.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "pretty" => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Logging configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format for log events.
    pub format: LogFormat,
    /// Default filter directives when `RUST_LOG` is unset.
    pub filter: String,
    /// Logical service name for startup logs.
    pub service_name: String,
}

impl LoggingConfig {
    /// Read configuration from `LOG_FORMAT`, `RUST_LOG` and `SERVICE_NAME`.
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|value| LogFormat::parse(&value))
            .unwrap_or(LogFormat::Json);
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "pathscope-service".to_string());

        Self {
            format,
            filter,
            service_name,
        }
    }

    /// Override the service name, keeping any `SERVICE_NAME` default.
    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: "info".to_string(),
            service_name: "pathscope-service".to_string(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Must be called at most once per process, before any spans or events are
/// emitted.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    tracing::info!(
        service = %config.service_name,
        format = ?config.format,
        "logging initialized"
    );
}
