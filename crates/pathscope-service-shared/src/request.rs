//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::ProblemDetails;
use pathscope_lib::SearchParams;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Request for starting a search session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Graph to search.
    pub graph_id: String,

    /// Registered algorithm name (e.g. "ucs", "astar", "bfs_graph").
    pub algorithm: String,

    /// Registered heuristic name, required by informed algorithms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<String>,

    /// Start node, as a numeric id or a node name.
    pub start_node: String,

    /// Goal node, as a numeric id or a node name.
    pub goal_node: String,
}

impl From<SearchRequest> for SearchParams {
    fn from(value: SearchRequest) -> Self {
        SearchParams {
            graph_id: value.graph_id,
            algorithm: value.algorithm,
            heuristic: value.heuristic,
            start: value.start_node,
            goal: value.goal_node,
        }
    }
}

impl Validate for SearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.graph_id.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'graph_id' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.algorithm.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'algorithm' field is required and cannot be empty",
                request_id,
            )));
        }

        if let Some(heuristic) = &self.heuristic {
            if heuristic.trim().is_empty() {
                return Err(Box::new(ProblemDetails::bad_request(
                    "The 'heuristic' field cannot be empty when present",
                    request_id,
                )));
            }
        }

        if self.start_node.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'start_node' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.goal_node.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'goal_node' field is required and cannot be empty",
                request_id,
            )));
        }

        Ok(())
    }
}

/// Query parameters for paging through a session's step log.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StepsQuery {
    /// Number of leading steps already consumed by the client.
    #[serde(default)]
    pub offset: usize,
}

/// Request body for the reachability endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityRequest {
    /// Start node, as a numeric id or a node name.
    pub start_node: String,

    /// Goal node, as a numeric id or a node name.
    pub goal_node: String,
}

impl Validate for ReachabilityRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.start_node.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'start_node' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.goal_node.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'goal_node' field is required and cannot be empty",
                request_id,
            )));
        }

        Ok(())
    }
}
