//! The generic expand/test/insert loop every algorithm configuration runs.

use std::collections::HashSet;

use crate::events::{StepEvent, StepSink};
use crate::graph::{Graph, NodeId};
use crate::search::frontier::Frontier;
use crate::search::{CancelToken, DuplicatePolicy, SearchNode, SearchOutcome};

/// Run one search to termination over `graph`.
///
/// The frontier's ordering policy and the duplicate policy are the only
/// degrees of freedom; everything else is fixed:
///
/// 1. the cancellation flag is read at every iteration boundary,
/// 2. an empty frontier emits `no_solution` and ends the run,
/// 3. a popped node already expanded (graph mode) is skipped silently,
/// 4. `expand` is emitted before the goal test, so a successful log always
///    ends `expand(goal), goal_found`,
/// 5. successors already expanded (graph mode) are not queued, and
/// 6. each surviving expansion emits one `frontier_update` with the
///    post-insertion frontier snapshot.
///
/// Duplicate frontier entries for one state are permitted; the pop-time skip
/// in step 3 keeps each state's expansion unique in graph mode. Tree mode
/// tracks nothing and may revisit states indefinitely.
pub fn search(
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
    frontier: &mut dyn Frontier,
    policy: DuplicatePolicy,
    sink: &mut dyn StepSink,
    cancel: &CancelToken,
) -> SearchOutcome {
    let mut expanded: HashSet<NodeId> = HashSet::new();
    frontier.insert(SearchNode::root(start));

    loop {
        if cancel.is_cancelled() {
            return SearchOutcome::Cancelled;
        }

        let Some(node) = frontier.pop() else {
            sink.record(StepEvent::no_solution());
            return SearchOutcome::Exhausted;
        };

        if policy == DuplicatePolicy::Graph && expanded.contains(&node.state) {
            continue;
        }

        sink.record(StepEvent::expand(node.state, expand_delta(policy, node.state)));

        if node.state == goal {
            let path = node.path();
            sink.record(StepEvent::goal_found(path.clone(), node.path_cost));
            return SearchOutcome::Solution {
                path,
                cost: node.path_cost,
            };
        }

        for edge in graph.neighbours(node.state) {
            if policy == DuplicatePolicy::Graph && expanded.contains(&edge.target) {
                continue;
            }
            frontier.insert(SearchNode::child(&node, edge.target, edge.length));
        }

        if policy == DuplicatePolicy::Graph {
            expanded.insert(node.state);
        }

        sink.record(StepEvent::frontier_update(node.state, frontier.states()));
    }
}

fn expand_delta(policy: DuplicatePolicy, state: NodeId) -> Vec<NodeId> {
    match policy {
        DuplicatePolicy::Graph => vec![state],
        DuplicatePolicy::Tree => vec![],
    }
}
