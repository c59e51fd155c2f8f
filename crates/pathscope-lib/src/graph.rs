use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier for a node within a loaded graph.
pub type NodeId = i64;

/// Earth radius in meters, used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPosition {
    /// Great-circle (haversine) distance to another position, in meters.
    pub fn haversine_to(&self, other: &GeoPosition) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dphi = (other.lat - self.lat).to_radians();
        let dlambda = (other.lon - self.lon).to_radians();

        let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }
}

/// Node within a loaded graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub position: GeoPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Directed edge within a graph's adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub length: f64,
}

/// Edge as it appears in graph files and serialized graph payloads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub length: f64,
}

/// Immutable weighted graph shared read-only across search sessions.
///
/// Adjacency lists are sorted by `(target, length)` at construction so that
/// neighbour enumeration order, and therefore every step log derived from it,
/// is reproducible.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    nodes: Arc<HashMap<NodeId, GraphNode>>,
    adjacency: Arc<HashMap<NodeId, Vec<Edge>>>,
    name_to_id: Arc<HashMap<String, NodeId>>,
    edge_count: usize,
}

impl Graph {
    /// Assemble a graph from nodes and edges, validating structural invariants.
    ///
    /// Every edge endpoint must name an existing node and every length must be
    /// finite and non-negative (the search algorithms assume no negative-cost
    /// edges). Undirected graphs mirror each edge at build time.
    pub fn build(directed: bool, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Result<Self> {
        let mut node_map: HashMap<NodeId, GraphNode> = HashMap::with_capacity(nodes.len());
        let mut name_to_id: HashMap<String, NodeId> = HashMap::new();
        for node in nodes {
            if node_map.contains_key(&node.id) {
                return Err(Error::InvalidGraph {
                    message: format!("duplicate node id {}", node.id),
                });
            }
            if let Some(name) = &node.name {
                name_to_id.insert(name.to_lowercase(), node.id);
            }
            node_map.insert(node.id, node);
        }

        let mut adjacency: HashMap<NodeId, Vec<Edge>> =
            node_map.keys().map(|&id| (id, Vec::new())).collect();
        let mut edge_count = 0;
        for edge in &edges {
            if !edge.length.is_finite() || edge.length < 0.0 {
                return Err(Error::InvalidGraph {
                    message: format!(
                        "edge {} -> {} has invalid length {}",
                        edge.source, edge.target, edge.length
                    ),
                });
            }
            for endpoint in [edge.source, edge.target] {
                if !node_map.contains_key(&endpoint) {
                    return Err(Error::InvalidGraph {
                        message: format!(
                            "edge {} -> {} references missing node {}",
                            edge.source, edge.target, endpoint
                        ),
                    });
                }
            }

            push_edge(&mut adjacency, edge.source, edge.target, edge.length);
            if !directed && edge.source != edge.target {
                push_edge(&mut adjacency, edge.target, edge.source, edge.length);
            }
            edge_count += 1;
        }

        for edges in adjacency.values_mut() {
            sort_edges(edges);
        }

        Ok(Self {
            directed,
            nodes: Arc::new(node_map),
            adjacency: Arc::new(adjacency),
            name_to_id: Arc::new(name_to_id),
            edge_count,
        })
    }

    /// Whether edges were loaded as one-way.
    pub fn directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges as declared in the source file (mirrored edges count once).
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the graph contains the given node id.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Look up a node record by id.
    pub fn node(&self, node: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&node)
    }

    /// Position of a node, if the node exists.
    pub fn position(&self, node: NodeId) -> Option<GeoPosition> {
        self.nodes.get(&node).map(|n| n.position)
    }

    /// Iterate over all node records in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Return the neighbours for a given node identifier.
    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a display name to a node id (case-insensitive).
    pub fn node_id_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(&name.to_lowercase()).copied()
    }

    /// Resolve a node reference that is either a numeric id or a display name.
    ///
    /// Numeric ids are tried first; anything else falls back to the
    /// case-insensitive name table. Unresolvable references fail with up to
    /// three fuzzy name suggestions.
    pub fn resolve_node(&self, reference: &str) -> Result<NodeId> {
        if let Ok(id) = reference.trim().parse::<NodeId>() {
            if self.contains(id) {
                return Ok(id);
            }
        }
        if let Some(id) = self.node_id_by_name(reference) {
            return Ok(id);
        }

        Err(Error::UnknownNode {
            node: reference.to_string(),
            suggestions: self.fuzzy_node_matches(reference, 3),
        })
    }

    /// Return up to `limit` node names similar to `name`, best match first.
    ///
    /// Uses Jaro-Winkler similarity with a 0.7 floor so wildly different
    /// inputs produce no suggestions rather than bad ones.
    pub fn fuzzy_node_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .nodes
            .values()
            .filter_map(|node| node.name.as_deref())
            .map(|candidate| (strsim::jaro_winkler(&needle, &candidate.to_lowercase()), candidate))
            .filter(|(score, _)| *score >= 0.7)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }

    /// Graph with every edge reversed, for searching backwards from a goal.
    ///
    /// Undirected graphs are their own reverse, so this is a cheap clone of
    /// the shared adjacency in that case.
    pub fn reversed(&self) -> Self {
        if !self.directed {
            return self.clone();
        }

        let mut adjacency: HashMap<NodeId, Vec<Edge>> =
            self.nodes.keys().map(|&id| (id, Vec::new())).collect();
        for (&source, edges) in self.adjacency.iter() {
            for edge in edges {
                adjacency.entry(edge.target).or_default().push(Edge {
                    target: source,
                    length: edge.length,
                });
            }
        }
        for edges in adjacency.values_mut() {
            sort_edges(edges);
        }

        Self {
            directed: self.directed,
            nodes: Arc::clone(&self.nodes),
            adjacency: Arc::new(adjacency),
            name_to_id: Arc::clone(&self.name_to_id),
            edge_count: self.edge_count,
        }
    }
}

fn push_edge(adjacency: &mut HashMap<NodeId, Vec<Edge>>, source: NodeId, target: NodeId, length: f64) {
    adjacency.entry(source).or_default().push(Edge { target, length });
}

fn sort_edges(edges: &mut [Edge]) {
    edges.sort_by(|a, b| {
        a.target
            .cmp(&b.target)
            .then_with(|| a.length.total_cmp(&b.length))
    });
}
