//! Pathscope graph search HTTP microservice.
//!
//! This service loads a directory of graph files at startup and exposes a
//! REST API for running replayable searches over them. Searches run on
//! worker threads inside [`pathscope_lib`]; clients poll the step log with
//! an offset.
//!
//! # Endpoints
//!
//! - `GET /api/v1/algorithms` - List registered search algorithms
//! - `GET /api/v1/heuristics` - List registered heuristics
//! - `POST /api/v1/search` - Start a search session
//! - `GET /api/v1/search/{session_id}/steps?offset=N` - Page through the step log
//! - `POST /api/v1/search/{session_id}/cancel` - Cancel a running session
//! - `DELETE /api/v1/search/{session_id}` - Drop a session
//! - `GET /api/v1/graphs` - List loaded graphs
//! - `GET /api/v1/graphs/{graph_id}` - Full node/edge payload of one graph
//! - `GET /api/v1/graphs/{graph_id}/nodes/{node}` - Resolve a node reference
//! - `POST /api/v1/graphs/{graph_id}/reachability` - Connectivity check
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! # Configuration
//!
//! - `PATHSCOPE_GRAPHS_DIR` - Directory of graph JSON files (default: /data/graphs)
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `SESSION_RETENTION_SECS` - How long finished sessions stay fetchable (default: 600)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default), text or pretty

#![deny(warnings)]

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Duration as ChronoDuration;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use pathscope_lib::{registry, NodeId, SearchParams, SessionStatus, StepPage};
use pathscope_service_shared::{
    from_lib_error, metrics_handler, record_search_finished, record_search_started,
    record_steps_served, AppState, HealthStatus, MetricsLayer, ProblemDetails,
    ReachabilityRequest, RequestId, SearchRequest, ServiceResponse, StepsQuery, Validate,
};

/// How often the retention sweeper wakes up.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(30);

/// Service configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory scanned for graph JSON files at startup.
    pub graphs_dir: String,
    /// HTTP port to listen on.
    pub port: u16,
    /// How long finished sessions stay fetchable, in seconds.
    pub retention_secs: u64,
}

impl ServiceConfig {
    /// Read configuration from `PATHSCOPE_GRAPHS_DIR`, `SERVICE_PORT` and
    /// `SESSION_RETENTION_SECS`.
    pub fn from_env() -> Self {
        let graphs_dir =
            env::var("PATHSCOPE_GRAPHS_DIR").unwrap_or_else(|_| "/data/graphs".to_string());
        let port = env::var("SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let retention_secs = env::var("SESSION_RETENTION_SECS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(600);

        Self {
            graphs_dir,
            port,
            retention_secs,
        }
    }

    /// Retention window as a chrono duration for the session store.
    pub fn retention(&self) -> ChronoDuration {
        ChronoDuration::seconds(self.retention_secs as i64)
    }
}

/// One algorithm catalog entry.
#[derive(Debug, Serialize)]
struct AlgorithmEntry {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    requires_heuristic: bool,
}

#[derive(Debug, Serialize)]
struct AlgorithmCatalog {
    algorithms: Vec<AlgorithmEntry>,
}

/// One heuristic catalog entry.
#[derive(Debug, Serialize)]
struct HeuristicEntry {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct HeuristicCatalog {
    heuristics: Vec<HeuristicEntry>,
}

/// Response to a successful session start.
#[derive(Debug, Serialize)]
struct SearchStarted {
    session_id: String,
    status: SessionStatus,
}

/// Response to a cancel request.
#[derive(Debug, Serialize)]
struct CancelResult {
    session_id: String,
    status: SessionStatus,
}

#[derive(Debug, Serialize)]
struct GraphCatalog {
    graphs: Vec<pathscope_lib::GraphMeta>,
}

/// A resolved node reference.
#[derive(Debug, Serialize)]
struct NodePayload {
    id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    lat: f64,
    lon: f64,
    /// Number of outgoing edges.
    degree: usize,
}

#[derive(Debug, Serialize)]
struct ReachabilityResult {
    reachable: bool,
}

/// Build the service router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/algorithms", get(list_algorithms))
        .route("/api/v1/heuristics", get(list_heuristics))
        .route("/api/v1/search", post(start_search))
        .route("/api/v1/search/{session_id}/steps", get(session_steps))
        .route("/api/v1/search/{session_id}/cancel", post(cancel_session))
        .route("/api/v1/search/{session_id}", delete(remove_session))
        .route("/api/v1/graphs", get(list_graphs))
        .route("/api/v1/graphs/{graph_id}", get(graph_payload))
        .route("/api/v1/graphs/{graph_id}/nodes/{node}", get(resolve_node))
        .route("/api/v1/graphs/{graph_id}/reachability", post(reachability))
        .route("/metrics", get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle GET /api/v1/algorithms.
async fn list_algorithms() -> ServiceResponse<AlgorithmCatalog> {
    let algorithms = registry::algorithms()
        .iter()
        .map(|info| AlgorithmEntry {
            name: info.name,
            display_name: info.display_name,
            description: info.description,
            requires_heuristic: info.requires_heuristic,
        })
        .collect();
    ServiceResponse::new(AlgorithmCatalog { algorithms })
}

/// Handle GET /api/v1/heuristics.
async fn list_heuristics() -> ServiceResponse<HeuristicCatalog> {
    let heuristics = registry::heuristics()
        .iter()
        .map(|info| HeuristicEntry {
            name: info.name,
            display_name: info.display_name,
            description: info.description,
        })
        .collect();
    ServiceResponse::new(HeuristicCatalog { heuristics })
}

/// Handle POST /api/v1/search requests.
async fn start_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<ServiceResponse<SearchStarted>, ProblemDetails> {
    let request_id = RequestId::generate();

    info!(
        request_id = %request_id,
        graph = %request.graph_id,
        algorithm = %request.algorithm,
        start = %request.start_node,
        goal = %request.goal_node,
        "handling search request"
    );

    request
        .validate(request_id.as_str())
        .map_err(|problem| *problem)?;

    let params = SearchParams::from(request);
    let session = state
        .sessions()
        .start(state.graphs(), &params)
        .map_err(|e| {
            warn!(request_id = %request_id, error = %e, "search rejected");
            from_lib_error(&e, request_id.as_str())
        })?;

    record_search_started(session.algorithm(), session.graph_id());

    info!(
        request_id = %request_id,
        session = %session.id(),
        "search session started"
    );

    Ok(ServiceResponse::new(SearchStarted {
        session_id: session.id().to_string(),
        status: session.status(),
    }))
}

/// Handle GET /api/v1/search/{session_id}/steps requests.
async fn session_steps(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<StepsQuery>,
) -> Result<ServiceResponse<StepPage>, ProblemDetails> {
    let request_id = RequestId::generate();

    let page = state
        .sessions()
        .steps(&session_id, query.offset)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    record_steps_served(page.steps.len());
    Ok(ServiceResponse::new(page))
}

/// Handle POST /api/v1/search/{session_id}/cancel requests.
async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<ServiceResponse<CancelResult>, ProblemDetails> {
    let request_id = RequestId::generate();

    let status = state
        .sessions()
        .cancel(&session_id)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    info!(request_id = %request_id, session = %session_id, status = ?status, "cancel requested");

    Ok(ServiceResponse::new(CancelResult {
        session_id,
        status,
    }))
}

/// Handle DELETE /api/v1/search/{session_id} requests.
async fn remove_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ProblemDetails> {
    let request_id = RequestId::generate();

    state
        .sessions()
        .remove(&session_id)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    info!(request_id = %request_id, session = %session_id, "session removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Handle GET /api/v1/graphs.
async fn list_graphs(State(state): State<AppState>) -> ServiceResponse<GraphCatalog> {
    let graphs = state.graphs().list().into_iter().cloned().collect();
    ServiceResponse::new(GraphCatalog { graphs })
}

/// Handle GET /api/v1/graphs/{graph_id}: the full node/edge payload.
async fn graph_payload(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
) -> Result<ServiceResponse<pathscope_lib::GraphPayload>, ProblemDetails> {
    let request_id = RequestId::generate();

    let payload = state
        .graphs()
        .payload(&graph_id)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    Ok(ServiceResponse::new(payload))
}

/// Handle GET /api/v1/graphs/{graph_id}/nodes/{node}: resolve a node
/// reference given as a numeric id or a display name.
async fn resolve_node(
    State(state): State<AppState>,
    Path((graph_id, node)): Path<(String, String)>,
) -> Result<ServiceResponse<NodePayload>, ProblemDetails> {
    let request_id = RequestId::generate();

    let graph = state
        .graphs()
        .get(&graph_id)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    let id = graph
        .resolve_node(&node)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    let Some(info) = graph.node(id) else {
        return Err(ProblemDetails::internal_error(
            format!("resolved node {id} missing from graph"),
            request_id.as_str(),
        ));
    };

    Ok(ServiceResponse::new(NodePayload {
        id,
        name: info.name.clone(),
        lat: info.position.lat,
        lon: info.position.lon,
        degree: graph.neighbours(id).len(),
    }))
}

/// Handle POST /api/v1/graphs/{graph_id}/reachability.
async fn reachability(
    State(state): State<AppState>,
    Path(graph_id): Path<String>,
    Json(request): Json<ReachabilityRequest>,
) -> Result<ServiceResponse<ReachabilityResult>, ProblemDetails> {
    let request_id = RequestId::generate();

    request
        .validate(request_id.as_str())
        .map_err(|problem| *problem)?;

    let graph = state
        .graphs()
        .get(&graph_id)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    let start = graph
        .resolve_node(&request.start_node)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;
    let goal = graph
        .resolve_node(&request.goal_node)
        .map_err(|e| from_lib_error(&e, request_id.as_str()))?;

    let reachable = pathscope_lib::reachable(&graph, start, goal);
    Ok(ServiceResponse::new(ReachabilityResult { reachable }))
}

/// Liveness probe handler.
async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Ready once at least one graph is loaded.
async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    if state.graphs().is_empty() {
        let status = HealthStatus::not_ready(service, version, "no graphs loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status =
        HealthStatus::ready(service, version, state.graphs().len(), state.sessions().len());
    (StatusCode::OK, Json(status)).into_response()
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Running => "running",
        SessionStatus::Completed => "completed",
        SessionStatus::Failed => "failed",
        SessionStatus::Cancelled => "cancelled",
    }
}

/// Periodic background task: record terminal outcomes once per session, then
/// drop sessions that finished longer than `retention` ago.
pub async fn retention_sweeper(state: AppState, retention: ChronoDuration, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    let mut reported: HashSet<String> = HashSet::new();

    loop {
        ticker.tick().await;

        for session in state.sessions().snapshot() {
            let status = session.status();
            if status.is_terminal() && reported.insert(session.id().to_string()) {
                record_search_finished(
                    session.algorithm(),
                    status_label(status),
                    session.step_count(),
                );
            }
        }

        let evicted = state.sessions().evict_finished(retention);
        if evicted > 0 {
            info!(evicted, "evicted finished sessions");
            reported.retain(|id| state.sessions().get(id).is_ok());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_match_wire_form() {
        assert_eq!(status_label(SessionStatus::Running), "running");
        assert_eq!(status_label(SessionStatus::Completed), "completed");
        assert_eq!(status_label(SessionStatus::Failed), "failed");
        assert_eq!(status_label(SessionStatus::Cancelled), "cancelled");
    }

    #[test]
    fn config_retention_is_seconds() {
        let config = ServiceConfig {
            graphs_dir: "/data/graphs".to_string(),
            port: 8080,
            retention_secs: 600,
        };
        assert_eq!(config.retention(), ChronoDuration::seconds(600));
    }
}
