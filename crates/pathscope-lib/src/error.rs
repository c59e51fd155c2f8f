use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the pathscope library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the graph directory does not exist or is not a directory.
    #[error("graph directory not found at {path}")]
    GraphDirNotFound { path: PathBuf },

    /// Raised when a graph id is not present in the store.
    #[error("unknown graph: {id}")]
    UnknownGraph { id: String },

    /// Raised when a graph file fails validation on load.
    #[error("invalid graph file {path}: {message}")]
    InvalidGraphFile { path: PathBuf, message: String },

    /// Raised when graph data violates a structural invariant.
    #[error("invalid graph: {message}")]
    InvalidGraph { message: String },

    /// Raised when two graph files claim the same graph id.
    #[error("duplicate graph id: {id}")]
    DuplicateGraph { id: String },

    /// Raised when a node reference could not be resolved in a graph.
    #[error("unknown node: {node}{}", format_suggestions(.suggestions))]
    UnknownNode {
        node: String,
        suggestions: Vec<String>,
    },

    /// Raised when an algorithm name is not present in the registry.
    #[error("unknown algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// Raised when a heuristic name is not present in the registry.
    #[error("unknown heuristic: {name}")]
    UnknownHeuristic { name: String },

    /// Raised when an algorithm requires a heuristic but none was supplied.
    #[error("algorithm {algorithm} requires a heuristic")]
    HeuristicRequired { algorithm: String },

    /// Raised when a session id is not present in the store.
    #[error("unknown session: {id}")]
    UnknownSession { id: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
