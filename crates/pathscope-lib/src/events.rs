//! Step events and the sink seam between the engine and its observers.
//!
//! The engine never formats output; it reports progress as [`StepEvent`]
//! values through [`StepSink::record`]. Unit tests collect events into a
//! `Vec`, live sessions append them to a locked session log, and callers that
//! only care about the outcome use [`NullSink`].

use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Kind discriminator for step events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Expand,
    FrontierUpdate,
    GoalFound,
    NoSolution,
}

/// One instrumented, ordered record of engine progress.
///
/// Events are append-only and immutable once emitted; their sequence number
/// is their position in the session's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub event: StepKind,

    /// The node the engine just processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_node: Option<NodeId>,

    /// Snapshot of frontier member states after this step's insertions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontier: Option<Vec<NodeId>>,

    /// States added to the expanded set by this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded_delta: Option<Vec<NodeId>>,

    /// Reconstructed solution path, goal events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution_path: Option<Vec<NodeId>>,

    /// Total cost of the solution path, goal events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_cost: Option<f64>,
}

impl StepEvent {
    /// Event for a node being expanded.
    pub fn expand(current_node: NodeId, expanded_delta: Vec<NodeId>) -> Self {
        Self {
            event: StepKind::Expand,
            current_node: Some(current_node),
            frontier: None,
            expanded_delta: Some(expanded_delta),
            solution_path: None,
            path_cost: None,
        }
    }

    /// Event for the frontier contents after an expansion's insertions.
    pub fn frontier_update(current_node: NodeId, frontier: Vec<NodeId>) -> Self {
        Self {
            event: StepKind::FrontierUpdate,
            current_node: Some(current_node),
            frontier: Some(frontier),
            expanded_delta: None,
            solution_path: None,
            path_cost: None,
        }
    }

    /// Terminal event for a found solution.
    pub fn goal_found(solution_path: Vec<NodeId>, path_cost: f64) -> Self {
        Self {
            event: StepKind::GoalFound,
            current_node: solution_path.last().copied(),
            frontier: None,
            expanded_delta: None,
            solution_path: Some(solution_path),
            path_cost: Some(path_cost),
        }
    }

    /// Terminal event for an exhausted frontier.
    pub fn no_solution() -> Self {
        Self {
            event: StepKind::NoSolution,
            current_node: None,
            frontier: None,
            expanded_delta: None,
            solution_path: None,
            path_cost: None,
        }
    }
}

/// Sink for step events emitted by the search engine.
pub trait StepSink {
    /// Record one event. Ordering follows emission order exactly.
    fn record(&mut self, event: StepEvent);
}

impl StepSink for Vec<StepEvent> {
    fn record(&mut self, event: StepEvent) {
        self.push(event);
    }
}

/// Sink that drops every event, for runs where only the outcome matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StepSink for NullSink {
    fn record(&mut self, _event: StepEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_serializes_with_sparse_fields() {
        let event = StepEvent::expand(7, vec![7]);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "expand");
        assert_eq!(json["current_node"], 7);
        assert_eq!(json["expanded_delta"][0], 7);
        assert!(json.get("frontier").is_none());
        assert!(json.get("solution_path").is_none());
        assert!(json.get("path_cost").is_none());
    }

    #[test]
    fn goal_found_carries_path_and_cost() {
        let event = StepEvent::goal_found(vec![1, 2, 3], 42.5);
        assert_eq!(event.current_node, Some(3));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "goal_found");
        assert_eq!(json["solution_path"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["path_cost"], 42.5);
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = StepEvent::frontier_update(2, vec![3, 4]);
        let json = serde_json::to_string(&event).unwrap();
        let back: StepEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn vec_sink_preserves_order() {
        let mut sink: Vec<StepEvent> = Vec::new();
        sink.record(StepEvent::expand(1, vec![1]));
        sink.record(StepEvent::no_solution());

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].event, StepKind::Expand);
        assert_eq!(sink[1].event, StepKind::NoSolution);
    }
}
