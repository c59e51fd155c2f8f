//! Search algorithms as configurations of the shared expansion loop.
//!
//! Every algorithm pairs a frontier discipline with a duplicate policy and
//! hands both to [`engine::search`]; only bidirectional search carries its
//! own loop. New algorithms implement [`SearchAlgorithm`] and register
//! through the [`crate::registry`] tables.

use crate::events::{NullSink, StepSink};
use crate::graph::{Graph, NodeId};
use crate::heuristics::HeuristicFn;
use crate::search::bidirectional;
use crate::search::engine;
use crate::search::frontier::{CostOrderedFrontier, FifoFrontier, LifoFrontier};
use crate::search::{CancelToken, DuplicatePolicy, SearchOutcome};

/// A runnable search algorithm.
///
/// `heuristic` is only consulted by informed algorithms; the rest ignore it.
/// Implementations must be callable from a worker thread, hence the
/// `Send + Sync` bound.
pub trait SearchAlgorithm: Send + Sync {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome;
}

/// Breadth-first search with an expanded set.
pub struct BreadthFirstGraph;

impl SearchAlgorithm for BreadthFirstGraph {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut frontier = FifoFrontier::default();
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Graph,
            sink,
            cancel,
        )
    }
}

/// Breadth-first search that may revisit states.
pub struct BreadthFirstTree;

impl SearchAlgorithm for BreadthFirstTree {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut frontier = FifoFrontier::default();
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Tree,
            sink,
            cancel,
        )
    }
}

/// Depth-first search with an expanded set.
pub struct DepthFirstGraph;

impl SearchAlgorithm for DepthFirstGraph {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut frontier = LifoFrontier::default();
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Graph,
            sink,
            cancel,
        )
    }
}

/// Depth-first search that may revisit states.
pub struct DepthFirstTree;

impl SearchAlgorithm for DepthFirstTree {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut frontier = LifoFrontier::default();
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Tree,
            sink,
            cancel,
        )
    }
}

/// Uniform cost search, ordered by accumulated path cost.
pub struct UniformCost;

impl SearchAlgorithm for UniformCost {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let mut frontier = CostOrderedFrontier::by_path_cost();
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Graph,
            sink,
            cancel,
        )
    }
}

/// A* search, ordered by path cost plus the heuristic estimate.
///
/// Without a heuristic the estimate falls back to zero, which degrades to
/// uniform cost search; callers that require one reject earlier, at
/// resolution time.
pub struct AStar;

impl SearchAlgorithm for AStar {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        let h = heuristic.unwrap_or_else(|| Box::new(|_| 0.0));
        let mut frontier =
            CostOrderedFrontier::new(move |node| node.path_cost + h(node.state));
        engine::search(
            graph,
            start,
            goal,
            &mut frontier,
            DuplicatePolicy::Graph,
            sink,
            cancel,
        )
    }
}

/// Bidirectional uniform cost search meeting in the middle.
pub struct Bidirectional;

impl SearchAlgorithm for Bidirectional {
    fn run(
        &self,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
        _heuristic: Option<HeuristicFn>,
        sink: &mut dyn StepSink,
        cancel: &CancelToken,
    ) -> SearchOutcome {
        bidirectional::search(graph, start, goal, sink, cancel)
    }
}

/// Whether `goal` can be reached from `start`. Runs an unlogged
/// breadth-first sweep.
pub fn reachable(graph: &Graph, start: NodeId, goal: NodeId) -> bool {
    let mut frontier = FifoFrontier::default();
    let mut sink = NullSink;
    engine::search(
        graph,
        start,
        goal,
        &mut frontier,
        DuplicatePolicy::Graph,
        &mut sink,
        &CancelToken::new(),
    )
    .is_solution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StepEvent;
    use crate::graph::{GeoPosition, GraphEdge, GraphNode};
    use crate::heuristics;

    fn node(id: NodeId) -> GraphNode {
        GraphNode {
            id,
            position: GeoPosition { lat: 0.0, lon: 0.0 },
            name: None,
        }
    }

    fn edge(source: NodeId, target: NodeId, length: f64) -> GraphEdge {
        GraphEdge {
            source,
            target,
            length,
        }
    }

    /// Two routes from 1 to 4: direct (cost 10) and via 2 and 3 (cost 3).
    fn two_route_graph() -> Graph {
        Graph::build(
            false,
            vec![node(1), node(2), node(3), node(4)],
            vec![
                edge(1, 2, 1.0),
                edge(2, 3, 1.0),
                edge(3, 4, 1.0),
                edge(1, 4, 10.0),
            ],
        )
        .unwrap()
    }

    fn run(
        algorithm: &dyn SearchAlgorithm,
        graph: &Graph,
        start: NodeId,
        goal: NodeId,
    ) -> SearchOutcome {
        let mut log: Vec<StepEvent> = Vec::new();
        algorithm.run(graph, start, goal, None, &mut log, &CancelToken::new())
    }

    #[test]
    fn breadth_first_takes_fewest_hops() {
        let graph = two_route_graph();
        let outcome = run(&BreadthFirstGraph, &graph, 1, 4);
        // Fewest hops is the expensive direct edge.
        assert_eq!(
            outcome,
            SearchOutcome::Solution {
                path: vec![1, 4],
                cost: 10.0
            }
        );
    }

    #[test]
    fn uniform_cost_takes_cheapest_route() {
        let graph = two_route_graph();
        let outcome = run(&UniformCost, &graph, 1, 4);
        assert_eq!(
            outcome,
            SearchOutcome::Solution {
                path: vec![1, 2, 3, 4],
                cost: 3.0
            }
        );
    }

    #[test]
    fn astar_without_heuristic_matches_uniform_cost() {
        let graph = two_route_graph();
        assert_eq!(run(&AStar, &graph, 1, 4), run(&UniformCost, &graph, 1, 4));
    }

    #[test]
    fn astar_with_zero_heuristic_matches_uniform_cost() {
        let graph = two_route_graph();
        let mut log: Vec<StepEvent> = Vec::new();
        let outcome = AStar.run(
            &graph,
            1,
            4,
            Some(heuristics::zero(&graph, 4)),
            &mut log,
            &CancelToken::new(),
        );
        assert_eq!(outcome, run(&UniformCost, &graph, 1, 4));
    }

    #[test]
    fn bidirectional_matches_uniform_cost_on_cost() {
        let graph = two_route_graph();
        let ucs = run(&UniformCost, &graph, 1, 4);
        let bidirectional = run(&Bidirectional, &graph, 1, 4);
        assert_eq!(ucs, bidirectional);
    }

    #[test]
    fn depth_first_graph_terminates_on_cycles() {
        let graph = Graph::build(
            false,
            vec![node(1), node(2), node(3)],
            vec![edge(1, 2, 1.0), edge(2, 3, 1.0), edge(3, 1, 1.0)],
        )
        .unwrap();
        assert!(run(&DepthFirstGraph, &graph, 1, 3).is_solution());
    }

    #[test]
    fn reachability_respects_components() {
        let graph = Graph::build(
            false,
            vec![node(1), node(2), node(8)],
            vec![edge(1, 2, 1.0)],
        )
        .unwrap();
        assert!(reachable(&graph, 1, 2));
        assert!(!reachable(&graph, 1, 8));
    }
}
