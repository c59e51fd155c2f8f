//! Shared infrastructure for pathscope HTTP services.
//!
//! This crate provides common functionality used by the service binaries:
//!
//! - [`AppState`]: Pre-loaded graph store and session store for handler access
//! - [`HealthStatus`]: Payloads for Kubernetes liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request tracking and metrics middleware
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! The services follow a thin-handler pattern where all search logic resides
//! in `pathscope-lib`. This crate provides only HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call pathscope-lib APIs                                  │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides in-memory fixture graphs and fresh
//! state for handler testing. Enable the `test-utils` feature to access it
//! from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::HealthStatus;
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_search_finished, record_search_started,
    record_steps_served, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_UNKNOWN_ALGORITHM, PROBLEM_UNKNOWN_GRAPH, PROBLEM_UNKNOWN_HEURISTIC,
    PROBLEM_UNKNOWN_NODE, PROBLEM_UNKNOWN_SESSION,
};
pub use request::{ReachabilityRequest, SearchRequest, StepsQuery, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
