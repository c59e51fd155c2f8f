//! Catalogue of the built-in algorithms and heuristics.
//!
//! Lookups go through [`algorithm`] and [`heuristic`]; [`resolve`] combines
//! both and enforces that informed algorithms get the heuristic they need.
//! The tables keep registration order so listings are stable across runs.

use once_cell::sync::Lazy;

use crate::algorithms::{
    AStar, Bidirectional, BreadthFirstGraph, BreadthFirstTree, DepthFirstGraph, DepthFirstTree,
    SearchAlgorithm, UniformCost,
};
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeId};
use crate::heuristics::{self, HeuristicFn};

/// Descriptor for a registered algorithm.
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub requires_heuristic: bool,
    factory: fn() -> Box<dyn SearchAlgorithm>,
}

impl AlgorithmInfo {
    /// Instantiate the algorithm.
    pub fn build(&self) -> Box<dyn SearchAlgorithm> {
        (self.factory)()
    }
}

/// Descriptor for a registered heuristic.
pub struct HeuristicInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    builder: fn(&Graph, NodeId) -> HeuristicFn,
}

impl HeuristicInfo {
    /// Build the estimator for a concrete graph and goal.
    pub fn build(&self, graph: &Graph, goal: NodeId) -> HeuristicFn {
        (self.builder)(graph, goal)
    }
}

static ALGORITHMS: Lazy<Vec<AlgorithmInfo>> = Lazy::new(|| {
    vec![
        AlgorithmInfo {
            name: "ucs",
            display_name: "Uniform Cost Search (UCS)",
            description: "Finds the optimal path by exploring nodes in order of path cost",
            requires_heuristic: false,
            factory: || Box::new(UniformCost),
        },
        AlgorithmInfo {
            name: "astar",
            display_name: "A* Search",
            description: "Informed search using path cost + heuristic estimate",
            requires_heuristic: true,
            factory: || Box::new(AStar),
        },
        AlgorithmInfo {
            name: "bidirectional",
            display_name: "Bidirectional Search",
            description: "Searches from both start and goal simultaneously",
            requires_heuristic: false,
            factory: || Box::new(Bidirectional),
        },
        AlgorithmInfo {
            name: "bfs_graph",
            display_name: "Breadth-First Search (Graph)",
            description: "Explores nodes level by level, avoids revisiting",
            requires_heuristic: false,
            factory: || Box::new(BreadthFirstGraph),
        },
        AlgorithmInfo {
            name: "bfs_tree",
            display_name: "Breadth-First Search (Tree)",
            description: "Explores nodes level by level, may revisit",
            requires_heuristic: false,
            factory: || Box::new(BreadthFirstTree),
        },
        AlgorithmInfo {
            name: "dfs_graph",
            display_name: "Depth-First Search (Graph)",
            description: "Explores as deep as possible before backtracking, avoids revisiting",
            requires_heuristic: false,
            factory: || Box::new(DepthFirstGraph),
        },
        AlgorithmInfo {
            name: "dfs_tree",
            display_name: "Depth-First Search (Tree)",
            description: "Explores as deep as possible before backtracking, may revisit",
            requires_heuristic: false,
            factory: || Box::new(DepthFirstTree),
        },
    ]
});

static HEURISTICS: Lazy<Vec<HeuristicInfo>> = Lazy::new(|| {
    vec![
        HeuristicInfo {
            name: "euclidean",
            display_name: "Euclidean Distance (Haversine)",
            description: "Straight-line distance on Earth's surface",
            builder: heuristics::haversine,
        },
        HeuristicInfo {
            name: "zero",
            display_name: "Zero Heuristic",
            description: "Always estimates zero, reducing informed search to uniform cost",
            builder: heuristics::zero,
        },
    ]
});

/// All registered algorithms, in registration order.
pub fn algorithms() -> &'static [AlgorithmInfo] {
    &ALGORITHMS
}

/// All registered heuristics, in registration order.
pub fn heuristics() -> &'static [HeuristicInfo] {
    &HEURISTICS
}

/// Look up an algorithm by name.
pub fn algorithm(name: &str) -> Result<&'static AlgorithmInfo> {
    ALGORITHMS
        .iter()
        .find(|info| info.name == name)
        .ok_or_else(|| Error::UnknownAlgorithm {
            name: name.to_string(),
        })
}

/// Look up a heuristic by name.
pub fn heuristic(name: &str) -> Result<&'static HeuristicInfo> {
    HEURISTICS
        .iter()
        .find(|info| info.name == name)
        .ok_or_else(|| Error::UnknownHeuristic {
            name: name.to_string(),
        })
}

/// Resolve an algorithm and optional heuristic pair, enforcing that
/// algorithms marked `requires_heuristic` actually receive one.
pub fn resolve(
    algorithm_name: &str,
    heuristic_name: Option<&str>,
) -> Result<(&'static AlgorithmInfo, Option<&'static HeuristicInfo>)> {
    let info = algorithm(algorithm_name)?;
    let heuristic_info = match heuristic_name {
        Some(name) => Some(heuristic(name)?),
        None if info.requires_heuristic => {
            return Err(Error::HeuristicRequired {
                algorithm: info.name.to_string(),
            });
        }
        None => None,
    };
    Ok((info, heuristic_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_algorithms_and_two_heuristics_registered() {
        assert_eq!(algorithms().len(), 7);
        assert_eq!(heuristics().len(), 2);
    }

    #[test]
    fn lookup_by_name() {
        let info = algorithm("ucs").unwrap();
        assert_eq!(info.display_name, "Uniform Cost Search (UCS)");
        assert!(!info.requires_heuristic);

        let info = algorithm("astar").unwrap();
        assert!(info.requires_heuristic);

        let info = heuristic("euclidean").unwrap();
        assert_eq!(info.display_name, "Euclidean Distance (Haversine)");
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            algorithm("dijkstra"),
            Err(Error::UnknownAlgorithm { .. })
        ));
        assert!(matches!(
            heuristic("manhattan"),
            Err(Error::UnknownHeuristic { .. })
        ));
    }

    #[test]
    fn astar_requires_a_heuristic() {
        assert!(matches!(
            resolve("astar", None),
            Err(Error::HeuristicRequired { .. })
        ));
        let (info, heuristic_info) = resolve("astar", Some("euclidean")).unwrap();
        assert_eq!(info.name, "astar");
        assert_eq!(heuristic_info.unwrap().name, "euclidean");
    }

    #[test]
    fn uninformed_algorithms_ignore_the_heuristic_slot() {
        let (info, heuristic_info) = resolve("bfs_graph", None).unwrap();
        assert_eq!(info.name, "bfs_graph");
        assert!(heuristic_info.is_none());
    }
}
