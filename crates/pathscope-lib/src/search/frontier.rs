//! Frontier orderings for the generic search loop.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;

use crate::graph::NodeId;
use crate::search::SearchNode;

/// Ordered multiset of search nodes awaiting expansion.
///
/// Equal ordering keys resolve by insertion order (first in, first expanded);
/// together with sorted neighbour enumeration this keeps step logs
/// deterministic.
pub trait Frontier {
    /// Queue a node according to the ordering policy.
    fn insert(&mut self, node: Arc<SearchNode>);

    /// Remove and return the next node per policy.
    fn pop(&mut self) -> Option<Arc<SearchNode>>;

    /// Whether any queued node is at `state`.
    fn contains_state(&self, state: NodeId) -> bool;

    /// Snapshot of queued states, next-to-pop first.
    fn states(&self) -> Vec<NodeId>;

    /// Number of queued nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in, first-out frontier (breadth-first).
#[derive(Default)]
pub struct FifoFrontier {
    queue: VecDeque<Arc<SearchNode>>,
}

impl FifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for FifoFrontier {
    fn insert(&mut self, node: Arc<SearchNode>) {
        self.queue.push_back(node);
    }

    fn pop(&mut self) -> Option<Arc<SearchNode>> {
        self.queue.pop_front()
    }

    fn contains_state(&self, state: NodeId) -> bool {
        self.queue.iter().any(|node| node.state == state)
    }

    fn states(&self) -> Vec<NodeId> {
        self.queue.iter().map(|node| node.state).collect()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last-in, first-out frontier (depth-first).
#[derive(Default)]
pub struct LifoFrontier {
    stack: Vec<Arc<SearchNode>>,
}

impl LifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for LifoFrontier {
    fn insert(&mut self, node: Arc<SearchNode>) {
        self.stack.push(node);
    }

    fn pop(&mut self) -> Option<Arc<SearchNode>> {
        self.stack.pop()
    }

    fn contains_state(&self, state: NodeId) -> bool {
        self.stack.iter().any(|node| node.state == state)
    }

    fn states(&self) -> Vec<NodeId> {
        self.stack.iter().rev().map(|node| node.state).collect()
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// Wrapper to allow f64 ordering keys inside the binary heap.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FloatOrd(f64);

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

struct CostEntry {
    key: FloatOrd,
    seq: u64,
    node: Arc<SearchNode>,
}

impl PartialEq for CostEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for CostEntry {}

impl PartialOrd for CostEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CostEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap behaviour; equal keys pop in insertion order.
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Best-first frontier ordered by an arbitrary key over nodes.
///
/// Uniform cost search keys on path cost alone; A* keys on path cost plus a
/// heuristic estimate. The key is evaluated once at insertion.
pub struct CostOrderedFrontier {
    heap: BinaryHeap<CostEntry>,
    key: Box<dyn Fn(&SearchNode) -> f64>,
    next_seq: u64,
}

impl CostOrderedFrontier {
    pub fn new(key: impl Fn(&SearchNode) -> f64 + 'static) -> Self {
        Self {
            heap: BinaryHeap::new(),
            key: Box::new(key),
            next_seq: 0,
        }
    }

    /// Frontier ordered by accumulated path cost.
    pub fn by_path_cost() -> Self {
        Self::new(|node| node.path_cost)
    }

    /// Ordering key of the next node to pop, if any.
    pub fn peek_key(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.key.0)
    }
}

impl Frontier for CostOrderedFrontier {
    fn insert(&mut self, node: Arc<SearchNode>) {
        let key = FloatOrd((self.key)(&node));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(CostEntry { key, seq, node });
    }

    fn pop(&mut self) -> Option<Arc<SearchNode>> {
        self.heap.pop().map(|entry| entry.node)
    }

    fn contains_state(&self, state: NodeId) -> bool {
        self.heap.iter().any(|entry| entry.node.state == state)
    }

    fn states(&self) -> Vec<NodeId> {
        let mut entries: Vec<(FloatOrd, u64, NodeId)> = self
            .heap
            .iter()
            .map(|entry| (entry.key, entry.seq, entry.node.state))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, state)| state).collect()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}
