//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use pathscope_lib::Error as LibError;

/// Problem type URI for unknown node references.
pub const PROBLEM_UNKNOWN_NODE: &str = "/problems/unknown-node";

/// Problem type URI for unknown graph ids.
pub const PROBLEM_UNKNOWN_GRAPH: &str = "/problems/unknown-graph";

/// Problem type URI for unknown search sessions.
pub const PROBLEM_UNKNOWN_SESSION: &str = "/problems/unknown-session";

/// Problem type URI for unknown algorithm names.
pub const PROBLEM_UNKNOWN_ALGORITHM: &str = "/problems/unknown-algorithm";

/// Problem type URI for unknown heuristic names.
pub const PROBLEM_UNKNOWN_HEURISTIC: &str = "/problems/unknown-heuristic";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// Provides a consistent format for error responses across all endpoints.
///
/// # Example
///
/// ```
/// use pathscope_service_shared::{ProblemDetails, PROBLEM_UNKNOWN_NODE};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_UNKNOWN_NODE,
///     "Unknown Node",
///     StatusCode::NOT_FOUND,
/// )
/// .with_detail("Node 'Cascsde' not found. Did you mean: 'Cascade'?")
/// .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    /// Add a detailed explanation of this specific problem occurrence.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add the request identifier for tracing.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// Create a 400 Bad Request problem for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown nodes.
    pub fn unknown_node(node: &str, suggestions: &[String], request_id: impl Into<String>) -> Self {
        let detail = if suggestions.is_empty() {
            format!("Node '{}' not found", node)
        } else {
            format!(
                "Node '{}' not found. Did you mean: {}?",
                node,
                suggestions.join(", ")
            )
        };

        Self::new(PROBLEM_UNKNOWN_NODE, "Unknown Node", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown graphs.
    pub fn unknown_graph(graph_id: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_GRAPH,
            "Unknown Graph",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Graph '{}' is not loaded", graph_id))
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown sessions.
    pub fn unknown_session(session_id: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_SESSION,
            "Unknown Session",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Search session '{}' does not exist", session_id))
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown algorithm names.
    pub fn unknown_algorithm(name: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_ALGORITHM,
            "Unknown Algorithm",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Algorithm '{}' is not registered", name))
        .with_request_id(request_id)
    }

    /// Create a 404 Not Found problem for unknown heuristic names.
    pub fn unknown_heuristic(name: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UNKNOWN_HEURISTIC,
            "Unknown Heuristic",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("Heuristic '{}' is not registered", name))
        .with_request_id(request_id)
    }

    /// Create a 500 Internal Server Error problem.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

/// Implement IntoResponse for axum to return ProblemDetails as HTTP responses.
impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );

        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't
/// carry one. Lookup failures map to 404, anything the caller could fix maps
/// to 400, and the rest becomes a 500.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::UnknownNode { node, suggestions } => {
            ProblemDetails::unknown_node(node, suggestions, request_id)
        }
        LibError::UnknownGraph { id } => ProblemDetails::unknown_graph(id, request_id),
        LibError::UnknownSession { id } => ProblemDetails::unknown_session(id, request_id),
        LibError::UnknownAlgorithm { name } => ProblemDetails::unknown_algorithm(name, request_id),
        LibError::UnknownHeuristic { name } => ProblemDetails::unknown_heuristic(name, request_id),
        LibError::HeuristicRequired { algorithm } => ProblemDetails::bad_request(
            format!("Algorithm '{}' requires a heuristic", algorithm),
            request_id,
        ),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
