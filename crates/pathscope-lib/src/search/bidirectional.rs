//! Bidirectional uniform-cost search.
//!
//! Two cost-ordered frontiers run inside one worker, one rooted at the start
//! on the graph and one at the goal on the reversed graph. The directions
//! alternate strictly, each expanding at most one node per turn, so runs are
//! deterministic. The first frontier overlap only yields a candidate meeting;
//! the search keeps refining until neither frontier could still produce a
//! cheaper combination, which makes the reported cost exactly the
//! shortest-path cost.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::events::{StepEvent, StepSink};
use crate::graph::{Graph, NodeId};
use crate::search::frontier::{CostOrderedFrontier, Frontier};
use crate::search::{CancelToken, SearchNode, SearchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

struct Side {
    frontier: CostOrderedFrontier,
    /// Best known path cost per reached state.
    reached: HashMap<NodeId, f64>,
    /// Cheapest node handle per reached state, for path reconstruction.
    nodes: HashMap<NodeId, Arc<SearchNode>>,
}

impl Side {
    fn rooted_at(state: NodeId) -> Self {
        let root = SearchNode::root(state);
        let mut frontier = CostOrderedFrontier::by_path_cost();
        frontier.insert(Arc::clone(&root));

        let mut side = Self {
            frontier,
            reached: HashMap::new(),
            nodes: HashMap::new(),
        };
        side.reached.insert(state, 0.0);
        side.nodes.insert(state, root);
        side
    }

    fn best_cost(&self, state: NodeId) -> f64 {
        self.reached.get(&state).copied().unwrap_or(f64::INFINITY)
    }

    /// Pop until a non-stale node surfaces. Stale entries carry a cost beaten
    /// by a later discovery of the same state.
    fn pop_fresh(&mut self) -> Option<Arc<SearchNode>> {
        while let Some(node) = self.frontier.pop() {
            if node.path_cost > self.best_cost(node.state) {
                continue;
            }
            return Some(node);
        }
        None
    }
}

/// Run a bidirectional search between `start` and `goal` on `graph`.
pub fn search(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    sink: &mut dyn StepSink,
    cancel: &CancelToken,
) -> SearchOutcome {
    if start == goal {
        sink.record(StepEvent::expand(start, vec![start]));
        sink.record(StepEvent::goal_found(vec![start], 0.0));
        return SearchOutcome::Solution {
            path: vec![start],
            cost: 0.0,
        };
    }

    let backward_graph = graph.reversed();
    let mut forward = Side::rooted_at(start);
    let mut backward = Side::rooted_at(goal);

    // Cheapest combined cost seen so far, with the pair of node handles that
    // realise it (one per direction, meeting at the same state).
    let mut best_total = f64::INFINITY;
    let mut meeting: Option<(Arc<SearchNode>, Arc<SearchNode>)> = None;

    // States already reported through an expand event, across both
    // directions, so expanded deltas never repeat a state.
    let mut reported: HashSet<NodeId> = HashSet::new();

    let mut turn = Direction::Forward;
    loop {
        if cancel.is_cancelled() {
            return SearchOutcome::Cancelled;
        }

        let min_forward = forward.frontier.peek_key().unwrap_or(f64::INFINITY);
        let min_backward = backward.frontier.peek_key().unwrap_or(f64::INFINITY);
        if min_forward.min(min_backward) >= best_total {
            break;
        }

        let direction = turn;
        turn = turn.flip();

        let (side, other, side_graph) = match direction {
            Direction::Forward => (&mut forward, &mut backward, graph),
            Direction::Backward => (&mut backward, &mut forward, &backward_graph),
        };

        // A direction with nothing fresh to expand forfeits its turn.
        let Some(node) = side.pop_fresh() else {
            continue;
        };

        let delta = if reported.insert(node.state) {
            vec![node.state]
        } else {
            vec![]
        };
        sink.record(StepEvent::expand(node.state, delta));

        for edge in side_graph.neighbours(node.state) {
            let child_cost = node.path_cost + edge.length;
            if child_cost >= side.best_cost(edge.target) {
                continue;
            }

            side.reached.insert(edge.target, child_cost);
            let child = SearchNode::child(&node, edge.target, edge.length);
            side.nodes.insert(edge.target, Arc::clone(&child));
            side.frontier.insert(Arc::clone(&child));

            // Meeting check: the child's state may already be reached from
            // the opposite direction.
            if let Some(&other_cost) = other.reached.get(&edge.target) {
                let total = child_cost + other_cost;
                if total < best_total {
                    best_total = total;
                    let opposite = Arc::clone(&other.nodes[&edge.target]);
                    meeting = Some(match direction {
                        Direction::Forward => (child, opposite),
                        Direction::Backward => (opposite, child),
                    });
                }
            }
        }

        let mut snapshot = forward.frontier.states();
        snapshot.extend(backward.frontier.states());
        sink.record(StepEvent::frontier_update(node.state, snapshot));
    }

    match meeting {
        Some((forward_meet, backward_meet)) => {
            let path = join_paths(&forward_meet, &backward_meet);
            sink.record(StepEvent::goal_found(path.clone(), best_total));
            SearchOutcome::Solution {
                path,
                cost: best_total,
            }
        }
        None => {
            sink.record(StepEvent::no_solution());
            SearchOutcome::Exhausted
        }
    }
}

/// Concatenate the start-to-meeting path with the reversed goal-to-meeting
/// path; the meeting state appears once.
fn join_paths(forward_meet: &SearchNode, backward_meet: &SearchNode) -> Vec<NodeId> {
    let mut path = forward_meet.path();
    let mut tail = backward_meet.path();
    tail.reverse();
    path.extend(tail.into_iter().skip(1));
    path
}
