//! Search primitives shared by every algorithm configuration.
//!
//! The pieces here are deliberately small: an immutable parent-linked
//! [`SearchNode`], pluggable [`frontier`] orderings, the generic
//! [`engine::search`] loop, and the interleaved [`bidirectional`] variant.
//! Concrete algorithms differ only in how they assemble these parts.

pub mod bidirectional;
pub mod engine;
pub mod frontier;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::graph::NodeId;

/// Parent-linked search-tree record.
///
/// Never mutated after creation; each expansion allocates children sharing
/// the parent chain, so the records form a tree even on cyclic graphs and a
/// solution path is reconstructed by walking to the root.
#[derive(Debug)]
pub struct SearchNode {
    pub state: NodeId,
    pub parent: Option<Arc<SearchNode>>,
    pub path_cost: f64,
    pub depth: usize,
}

impl SearchNode {
    /// Root node for a search's start state.
    pub fn root(state: NodeId) -> Arc<Self> {
        Arc::new(Self {
            state,
            parent: None,
            path_cost: 0.0,
            depth: 0,
        })
    }

    /// Child of `parent` reached over an edge costing `step_cost`.
    pub fn child(parent: &Arc<SearchNode>, state: NodeId, step_cost: f64) -> Arc<Self> {
        Arc::new(Self {
            state,
            parent: Some(Arc::clone(parent)),
            path_cost: parent.path_cost + step_cost,
            depth: parent.depth + 1,
        })
    }

    /// States from the root to this node, in travel order.
    pub fn path(&self) -> Vec<NodeId> {
        let mut path = vec![self.state];
        let mut cursor = self.parent.as_deref();
        while let Some(node) = cursor {
            path.push(node.state);
            cursor = node.parent.as_deref();
        }
        path.reverse();
        path
    }
}

/// Duplicate-suppression mode for the generic loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Track expanded states; a state is expanded at most once.
    Graph,
    /// No tracking; states may be revisited indefinitely, including along
    /// the same path.
    Tree,
}

/// Cooperative cancellation flag shared between a session and its worker.
///
/// The engine reads it at each loop iteration boundary; setting it never
/// interrupts an expansion already in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Terminal result of one engine run.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Goal reached; states in travel order plus the total path cost.
    Solution { path: Vec<NodeId>, cost: f64 },
    /// Frontier exhausted without reaching the goal.
    Exhausted,
    /// The cancellation flag was observed before termination.
    Cancelled,
}

impl SearchOutcome {
    pub fn is_solution(&self) -> bool {
        matches!(self, Self::Solution { .. })
    }
}
