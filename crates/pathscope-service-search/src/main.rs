//! Binary entry point for the pathscope search service.
//!
//! Configuration and endpoint documentation live in the crate library
//! ([`pathscope_service_search`]).

#![deny(warnings)]

use std::net::SocketAddr;

use tracing::{error, info};

use pathscope_service_search::{app, retention_sweeper, ServiceConfig, SWEEP_PERIOD};
use pathscope_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (reads LOG_FORMAT from environment)
    let logging_config = LoggingConfig::from_env().with_service("search");
    init_logging(&logging_config);

    // Initialize metrics
    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Log but don't fail - metrics are optional
        tracing::warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        graphs_dir = %config.graphs_dir,
        port = config.port,
        retention_secs = config.retention_secs,
        "starting search service"
    );

    // Load application state
    let state = AppState::load(&config.graphs_dir).map_err(|e| {
        error!(error = %e, path = %config.graphs_dir, "failed to load application state");
        e
    })?;

    info!(graphs = state.graphs().len(), "application state loaded");

    // Background reclamation of finished sessions
    tokio::spawn(retention_sweeper(
        state.clone(),
        config.retention(),
        SWEEP_PERIOD,
    ));

    // Build the router
    let router = app(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
