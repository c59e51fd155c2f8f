//! Pathscope library entry points.
//!
//! This crate loads road-network graphs into memory, runs the search
//! algorithms over them, and records replayable step logs per search
//! session. Higher-level consumers (CLI, HTTP service) should only depend on
//! the types exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod algorithms;
pub mod error;
pub mod events;
pub mod graph;
pub mod heuristics;
pub mod registry;
pub mod search;
pub mod sessions;
pub mod store;

pub use algorithms::{reachable, SearchAlgorithm};
pub use error::{Error, Result};
pub use events::{NullSink, StepEvent, StepKind, StepSink};
pub use graph::{GeoPosition, Graph, GraphEdge, GraphNode, NodeId};
pub use heuristics::HeuristicFn;
pub use registry::{AlgorithmInfo, HeuristicInfo};
pub use search::{CancelToken, SearchOutcome};
pub use sessions::{SearchParams, Session, SessionStatus, SessionStore, StepPage};
pub use store::{load_graph_file, GraphMeta, GraphPayload, GraphStore};
