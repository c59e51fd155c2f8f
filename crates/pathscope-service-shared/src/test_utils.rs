//! Test utilities for service handler testing.
//!
//! This module provides in-memory fixture graphs and helpers for testing
//! HTTP handlers without touching the filesystem.

use pathscope_lib::{GeoPosition, Graph, GraphEdge, GraphNode, GraphStore};

use crate::state::AppState;

/// Graph id of the three-node fixture with named nodes.
pub const TOWN_GRAPH: &str = "town";

/// Graph id of the fixture with two disconnected components.
pub const ISLANDS_GRAPH: &str = "islands";

/// Known node names in the town fixture for use in tests.
pub mod fixture_nodes {
    /// Node 1, connected to both other nodes.
    pub const OPERA: &str = "Opera";

    /// Node 2, on the cheap detour between Opera and Station.
    pub const CASCADE: &str = "Cascade";

    /// Node 3, the usual search goal.
    pub const STATION: &str = "Station";
}

/// Build the town fixture graph.
///
/// Three named nodes where the direct Opera-Station road (3900 m) is shorter
/// than the detour through Cascade (1200 m + 4500 m). Coordinates are chosen
/// so straight-line distance never exceeds road length.
///
/// # Panics
///
/// Panics if the fixture fails validation. This indicates a test
/// configuration issue.
pub fn town_graph() -> Graph {
    Graph::build(
        false,
        vec![
            GraphNode {
                id: 1,
                position: GeoPosition {
                    lat: 45.000,
                    lon: 7.650,
                },
                name: Some(fixture_nodes::OPERA.to_string()),
            },
            GraphNode {
                id: 2,
                position: GeoPosition {
                    lat: 45.008,
                    lon: 7.655,
                },
                name: Some(fixture_nodes::CASCADE.to_string()),
            },
            GraphNode {
                id: 3,
                position: GeoPosition {
                    lat: 45.020,
                    lon: 7.680,
                },
                name: Some(fixture_nodes::STATION.to_string()),
            },
        ],
        vec![
            GraphEdge {
                source: 1,
                target: 2,
                length: 1200.0,
            },
            GraphEdge {
                source: 2,
                target: 3,
                length: 4500.0,
            },
            GraphEdge {
                source: 1,
                target: 3,
                length: 3900.0,
            },
        ],
    )
    .unwrap_or_else(|e| panic!("town fixture failed to build: {}", e))
}

/// Build the islands fixture graph: two pairs with no path between them.
///
/// # Panics
///
/// Panics if the fixture fails validation.
pub fn islands_graph() -> Graph {
    Graph::build(
        false,
        vec![
            GraphNode {
                id: 10,
                position: GeoPosition { lat: 0.0, lon: 0.0 },
                name: None,
            },
            GraphNode {
                id: 11,
                position: GeoPosition {
                    lat: 0.0,
                    lon: 0.004,
                },
                name: None,
            },
            GraphNode {
                id: 20,
                position: GeoPosition { lat: 1.0, lon: 1.0 },
                name: None,
            },
            GraphNode {
                id: 21,
                position: GeoPosition {
                    lat: 1.0,
                    lon: 1.006,
                },
                name: None,
            },
        ],
        vec![
            GraphEdge {
                source: 10,
                target: 11,
                length: 500.0,
            },
            GraphEdge {
                source: 20,
                target: 21,
                length: 750.0,
            },
        ],
    )
    .unwrap_or_else(|e| panic!("islands fixture failed to build: {}", e))
}

/// Build a fresh AppState holding the fixture graphs.
///
/// Each call returns an independent state with an empty session store, so
/// tests that start or cancel sessions cannot observe each other.
///
/// # Panics
///
/// Panics if a fixture graph cannot be registered.
pub fn test_state() -> AppState {
    let mut graphs = GraphStore::new();
    graphs
        .register(TOWN_GRAPH, "Town", None, town_graph())
        .unwrap_or_else(|e| panic!("failed to register town fixture: {}", e));
    graphs
        .register(ISLANDS_GRAPH, "Islands", None, islands_graph())
        .unwrap_or_else(|e| panic!("failed to register islands fixture: {}", e));
    AppState::from_components(graphs)
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-{}", timestamp)
}
