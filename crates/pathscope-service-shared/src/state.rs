//! Application state for the pathscope HTTP service.
//!
//! This module provides the shared state structure that axum handlers use to
//! access the loaded graphs and the session table.

use std::path::Path;
use std::sync::Arc;

use pathscope_lib::{Error as LibError, GraphStore, SessionStore};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to load the graph directory.
    GraphLoad(LibError),

    /// Graph directory not found.
    GraphDirNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphLoad(e) => write!(f, "failed to load graphs: {}", e),
            Self::GraphDirNotFound(path) => write!(f, "graph directory not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad(e) => Some(e),
            Self::GraphDirNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::GraphLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use pathscope_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let graphs = state.graphs();
///     // ... use graphs
/// }
///
/// let state = AppState::load("path/to/graphs").unwrap();
/// let app = Router::new()
///     .route("/api/v1/search", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    graphs: GraphStore,
    sessions: SessionStore,
}

impl AppState {
    /// Load application state from a directory of graph JSON files.
    ///
    /// Every `*.json` file in the directory becomes one graph; the session
    /// table starts empty.
    pub fn load(graphs_dir: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let graphs_dir = graphs_dir.as_ref();

        if !graphs_dir.is_dir() {
            return Err(AppStateError::GraphDirNotFound(
                graphs_dir.display().to_string(),
            ));
        }

        tracing::info!(path = %graphs_dir.display(), "loading graphs");
        let graphs = GraphStore::from_dir(graphs_dir)?;

        Ok(Self::from_components(graphs))
    }

    /// Create application state from a pre-loaded graph store.
    ///
    /// This is useful for testing or when graphs are registered in memory.
    pub fn from_components(graphs: GraphStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                graphs,
                sessions: SessionStore::new(),
            }),
        }
    }

    /// Access the loaded graphs.
    pub fn graphs(&self) -> &GraphStore {
        &self.inner.graphs
    }

    /// Access the session table.
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("graph_count", &self.inner.graphs.len())
            .field("session_count", &self.inner.sessions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathscope_lib::{GeoPosition, Graph, GraphEdge, GraphNode};

    fn minimal_store() -> GraphStore {
        let graph = Graph::build(
            false,
            vec![
                GraphNode {
                    id: 1,
                    position: GeoPosition { lat: 0.0, lon: 0.0 },
                    name: Some("Alpha".to_string()),
                },
                GraphNode {
                    id: 2,
                    position: GeoPosition { lat: 0.0, lon: 0.1 },
                    name: None,
                },
            ],
            vec![GraphEdge {
                source: 1,
                target: 2,
                length: 10.0,
            }],
        )
        .expect("fixture graph builds");

        let mut store = GraphStore::new();
        store
            .register("mini", "Mini", None, graph)
            .expect("fixture registers");
        store
    }

    #[test]
    fn app_state_from_components() {
        let state = AppState::from_components(minimal_store());

        assert_eq!(state.graphs().len(), 1);
        assert!(state.sessions().is_empty());
    }

    #[test]
    fn app_state_clone_shares_the_session_table() {
        let state1 = AppState::from_components(minimal_store());
        let state2 = state1.clone();

        assert_eq!(state1.graphs().len(), state2.graphs().len());
        // Same inner table, so counts track each other.
        assert_eq!(state1.sessions().len(), state2.sessions().len());
    }

    #[test]
    fn app_state_debug() {
        let state = AppState::from_components(minimal_store());
        let debug = format!("{:?}", state);

        assert!(debug.contains("AppState"));
        assert!(debug.contains("graph_count"));
        assert!(debug.contains("session_count"));
    }

    #[test]
    fn app_state_error_display() {
        let err = AppStateError::GraphDirNotFound("/path/to/graphs".to_string());
        assert!(err.to_string().contains("/path/to/graphs"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn app_state_load_nonexistent() {
        let result = AppState::load("/nonexistent/path/to/graphs");

        match result {
            Err(AppStateError::GraphDirNotFound(path)) => {
                assert!(path.contains("nonexistent"));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
