//! Heuristic estimators for informed search.
//!
//! A heuristic is built once per search from the graph and the goal state,
//! then queried per node. Building returns a boxed closure so the search
//! worker can carry it across a thread boundary.

use crate::graph::{Graph, NodeId};

/// Estimate of the remaining cost from a state to the goal.
pub type HeuristicFn = Box<dyn Fn(NodeId) -> f64 + Send + Sync>;

/// Great-circle distance in metres between a node and the goal.
///
/// Edge lengths measure road distance in metres, which is never shorter than
/// the straight line between the endpoints, so the estimate is admissible.
/// Nodes without a position estimate zero.
pub fn haversine(graph: &Graph, goal: NodeId) -> HeuristicFn {
    let graph = graph.clone();
    let goal_position = graph.position(goal);
    Box::new(move |state| {
        match (graph.position(state), goal_position) {
            (Some(from), Some(to)) => from.haversine_to(&to),
            _ => 0.0,
        }
    })
}

/// Estimates zero everywhere, reducing informed search to uniform cost.
pub fn zero(_graph: &Graph, _goal: NodeId) -> HeuristicFn {
    Box::new(|_| 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GeoPosition, GraphNode};

    fn positioned(id: NodeId, lat: f64, lon: f64) -> GraphNode {
        GraphNode {
            id,
            position: GeoPosition { lat, lon },
            name: None,
        }
    }

    #[test]
    fn haversine_is_zero_at_the_goal() {
        let graph = Graph::build(
            false,
            vec![positioned(1, 40.1872, 44.5152), positioned(2, 40.1536, 44.4944)],
            vec![],
        )
        .unwrap();
        let h = haversine(&graph, 2);
        assert_eq!(h(2), 0.0);
    }

    #[test]
    fn haversine_matches_one_degree_of_longitude() {
        // One degree of longitude on the equator is roughly 111.19 km.
        let graph = Graph::build(
            false,
            vec![positioned(1, 0.0, 0.0), positioned(2, 0.0, 1.0)],
            vec![],
        )
        .unwrap();
        let h = haversine(&graph, 2);
        let metres = h(1);
        assert!((metres - 111_195.0).abs() < 50.0, "got {metres}");
    }

    #[test]
    fn unknown_states_estimate_zero() {
        let graph = Graph::build(false, vec![positioned(1, 0.0, 0.0)], vec![]).unwrap();
        let h = haversine(&graph, 1);
        assert_eq!(h(77), 0.0);
    }

    #[test]
    fn zero_heuristic_is_always_zero() {
        let graph = Graph::build(false, vec![positioned(1, 0.0, 0.0)], vec![]).unwrap();
        let h = zero(&graph, 1);
        assert_eq!(h(1), 0.0);
        assert_eq!(h(99), 0.0);
    }
}
