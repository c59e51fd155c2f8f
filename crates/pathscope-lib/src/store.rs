//! In-memory catalog of loaded graphs.
//!
//! Graphs are plain JSON files loaded once at startup; after that the catalog
//! is read-only and every graph is shared behind an [`Arc`], so concurrent
//! search sessions never copy or lock graph data.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{Graph, GraphEdge, GraphNode};

/// Geographic bounding box of a graph's nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Display metadata for a loaded graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMeta {
    pub graph_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub node_count: usize,
    pub edge_count: usize,
    pub bbox: BoundingBox,
}

/// Full node/edge serialization of a graph, for rendering clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// On-disk graph file schema.
#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    graph_id: Option<String>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    directed: bool,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

#[derive(Debug)]
struct StoredGraph {
    meta: GraphMeta,
    graph: Arc<Graph>,
}

/// Load and validate a single graph file.
///
/// The graph id defaults to the file stem when the file carries none. Used by
/// [`GraphStore::from_dir`] for each file and directly by callers working
/// with one graph at a time.
pub fn load_graph_file(path: impl AsRef<Path>) -> Result<(GraphMeta, Graph)> {
    let path = path.as_ref();
    let file: GraphFile = serde_json::from_str(&fs::read_to_string(path)?).map_err(|err| {
        Error::InvalidGraphFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;

    let graph_id = file.graph_id.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let graph = Graph::build(file.directed, file.nodes, file.edges).map_err(|err| match err {
        Error::InvalidGraph { message } => Error::InvalidGraphFile {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })?;

    let meta = GraphMeta {
        graph_id,
        name: file.name,
        description: file.description,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        bbox: bounding_box(&graph),
    };
    Ok((meta, graph))
}

/// Catalog of graphs addressable by id.
#[derive(Debug, Default)]
pub struct GraphStore {
    graphs: HashMap<String, StoredGraph>,
}

impl GraphStore {
    /// Create an empty store. Mostly useful for tests that register fixtures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file in `dir` as a graph.
    ///
    /// Files are visited in path order so load logging and duplicate-id
    /// detection are deterministic. Any invalid file aborts the load.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::GraphDirNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut store = Self::new();
        for path in &paths {
            let (meta, graph) = load_graph_file(path)?;
            tracing::info!(
                graph_id = %meta.graph_id,
                nodes = meta.node_count,
                edges = meta.edge_count,
                "loaded graph"
            );
            store.register(meta.graph_id.clone(), meta.name, meta.description, graph)?;
        }

        tracing::info!(graphs = store.len(), dir = %dir.display(), "graph store ready");
        Ok(store)
    }

    /// Register an already-built graph under an id.
    pub fn register(
        &mut self,
        graph_id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        graph: Graph,
    ) -> Result<()> {
        let graph_id = graph_id.into();
        if self.graphs.contains_key(&graph_id) {
            return Err(Error::DuplicateGraph { id: graph_id });
        }

        let meta = GraphMeta {
            graph_id: graph_id.clone(),
            name: name.into(),
            description,
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            bbox: bounding_box(&graph),
        };
        self.graphs.insert(
            graph_id,
            StoredGraph {
                meta,
                graph: Arc::new(graph),
            },
        );
        Ok(())
    }

    /// Number of graphs in the store.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether the store holds no graphs.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Metadata for every graph, ordered by graph id.
    pub fn list(&self) -> Vec<&GraphMeta> {
        let mut metas: Vec<&GraphMeta> = self.graphs.values().map(|g| &g.meta).collect();
        metas.sort_by(|a, b| a.graph_id.cmp(&b.graph_id));
        metas
    }

    /// Shared handle to a graph by id.
    pub fn get(&self, graph_id: &str) -> Result<Arc<Graph>> {
        self.graphs
            .get(graph_id)
            .map(|g| Arc::clone(&g.graph))
            .ok_or_else(|| Error::UnknownGraph {
                id: graph_id.to_string(),
            })
    }

    /// Metadata for one graph by id.
    pub fn meta(&self, graph_id: &str) -> Result<&GraphMeta> {
        self.graphs
            .get(graph_id)
            .map(|g| &g.meta)
            .ok_or_else(|| Error::UnknownGraph {
                id: graph_id.to_string(),
            })
    }

    /// Full node/edge payload for one graph, nodes and edges in sorted order.
    ///
    /// Undirected graphs report each edge once with `source <= target`.
    pub fn payload(&self, graph_id: &str) -> Result<GraphPayload> {
        let graph = self.get(graph_id)?;

        let mut nodes: Vec<GraphNode> = graph.nodes().cloned().collect();
        nodes.sort_by_key(|n| n.id);

        let mut edges: Vec<GraphEdge> = Vec::with_capacity(graph.edge_count());
        for node in &nodes {
            for edge in graph.neighbours(node.id) {
                if !graph.directed() && edge.target < node.id {
                    continue;
                }
                edges.push(GraphEdge {
                    source: node.id,
                    target: edge.target,
                    length: edge.length,
                });
            }
        }

        Ok(GraphPayload { nodes, edges })
    }
}

fn bounding_box(graph: &Graph) -> BoundingBox {
    let mut bbox = BoundingBox {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
    };
    for node in graph.nodes() {
        bbox.min_lat = bbox.min_lat.min(node.position.lat);
        bbox.max_lat = bbox.max_lat.max(node.position.lat);
        bbox.min_lon = bbox.min_lon.min(node.position.lon);
        bbox.max_lon = bbox.max_lon.max(node.position.lon);
    }
    if graph.node_count() == 0 {
        bbox = BoundingBox {
            min_lat: 0.0,
            max_lat: 0.0,
            min_lon: 0.0,
            max_lon: 0.0,
        };
    }
    bbox
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::graph::{GeoPosition, NodeId};

    fn write_graph_file(dir: &Path, file_name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(file_name)).expect("create graph file");
        file.write_all(contents.as_bytes()).expect("write graph file");
    }

    const TRIANGLE: &str = r#"{
        "name": "Triangle",
        "description": "Three nodes in a loop",
        "nodes": [
            {"id": 1, "lat": 40.0, "lon": 44.0, "name": "A"},
            {"id": 2, "lat": 40.1, "lon": 44.1, "name": "B"},
            {"id": 3, "lat": 40.2, "lon": 44.0, "name": "C"}
        ],
        "edges": [
            {"source": 1, "target": 2, "length": 100.0},
            {"source": 2, "target": 3, "length": 150.0},
            {"source": 1, "target": 3, "length": 300.0}
        ]
    }"#;

    #[test]
    fn from_dir_loads_json_graphs() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_graph_file(dir.path(), "triangle.json", TRIANGLE);
        write_graph_file(dir.path(), "notes.txt", "not a graph");

        let store = GraphStore::from_dir(dir.path()).expect("store loads");
        assert_eq!(store.len(), 1);

        let meta = store.meta("triangle").expect("metadata");
        assert_eq!(meta.name, "Triangle");
        assert_eq!(meta.node_count, 3);
        assert_eq!(meta.edge_count, 3);
        assert_eq!(meta.bbox.min_lat, 40.0);
        assert_eq!(meta.bbox.max_lat, 40.2);

        let graph = store.get("triangle").expect("graph");
        assert_eq!(graph.neighbours(1).len(), 2);
    }

    #[test]
    fn graph_id_field_overrides_file_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let with_id = TRIANGLE.replacen(
            "\"name\": \"Triangle\"",
            "\"graph_id\": \"tri\", \"name\": \"Triangle\"",
            1,
        );
        write_graph_file(dir.path(), "triangle.json", &with_id);

        let store = GraphStore::from_dir(dir.path()).expect("store loads");
        assert!(store.get("tri").is_ok());
        assert!(matches!(
            store.get("triangle"),
            Err(Error::UnknownGraph { .. })
        ));
    }

    #[test]
    fn invalid_weight_aborts_load_with_file_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = TRIANGLE.replace("\"length\": 300.0", "\"length\": -5.0");
        write_graph_file(dir.path(), "triangle.json", &bad);

        let err = GraphStore::from_dir(dir.path()).unwrap_err();
        match err {
            Error::InvalidGraphFile { path, message } => {
                assert!(path.ends_with("triangle.json"));
                assert!(message.contains("invalid length"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_dir_is_reported() {
        let err = GraphStore::from_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, Error::GraphDirNotFound { .. }));
    }

    #[test]
    fn payload_reports_undirected_edges_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_graph_file(dir.path(), "triangle.json", TRIANGLE);
        let store = GraphStore::from_dir(dir.path()).expect("store loads");

        let payload = store.payload("triangle").expect("payload");
        assert_eq!(payload.nodes.len(), 3);
        assert_eq!(payload.edges.len(), 3);
        assert!(payload.edges.iter().all(|e| e.source <= e.target));
        let ids: Vec<NodeId> = payload.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn load_graph_file_reads_one_graph() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_graph_file(dir.path(), "triangle.json", TRIANGLE);

        let (meta, graph) = load_graph_file(dir.path().join("triangle.json")).expect("loads");
        assert_eq!(meta.graph_id, "triangle");
        assert_eq!(meta.name, "Triangle");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.resolve_node("B").expect("named node"), 2);
    }

    #[test]
    fn register_rejects_duplicate_ids() {
        let mut store = GraphStore::new();
        let graph = Graph::build(
            false,
            vec![GraphNode {
                id: 1,
                position: GeoPosition { lat: 0.0, lon: 0.0 },
                name: None,
            }],
            vec![],
        )
        .unwrap();

        store
            .register("g", "First", None, graph.clone())
            .expect("first registration");
        let err = store.register("g", "Second", None, graph).unwrap_err();
        assert!(matches!(err, Error::DuplicateGraph { .. }));
    }
}
