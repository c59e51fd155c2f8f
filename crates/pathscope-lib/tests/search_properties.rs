use std::collections::{HashMap, HashSet};

use pathscope_lib::algorithms::{
    AStar, Bidirectional, BreadthFirstGraph, BreadthFirstTree, DepthFirstGraph, DepthFirstTree,
    UniformCost,
};
use pathscope_lib::{
    heuristics, CancelToken, GeoPosition, Graph, GraphEdge, GraphNode, NodeId, SearchAlgorithm,
    SearchOutcome, StepEvent, StepKind,
};

fn node(id: NodeId) -> GraphNode {
    GraphNode {
        id,
        position: GeoPosition { lat: 0.0, lon: 0.0 },
        name: None,
    }
}

fn positioned(id: NodeId, lat: f64, lon: f64) -> GraphNode {
    GraphNode {
        id,
        position: GeoPosition { lat, lon },
        name: None,
    }
}

fn edge(source: NodeId, target: NodeId, length: f64) -> GraphEdge {
    GraphEdge {
        source,
        target,
        length,
    }
}

/// Ring of eight nodes with two chords and one zero-length edge.
fn ring_with_chords() -> Graph {
    Graph::build(
        false,
        (1..=8).map(node).collect(),
        vec![
            edge(1, 2, 1.0),
            edge(2, 3, 2.5),
            edge(3, 4, 1.0),
            edge(4, 5, 0.0),
            edge(5, 6, 4.0),
            edge(6, 7, 1.5),
            edge(7, 8, 1.0),
            edge(8, 1, 2.0),
            edge(2, 6, 3.0),
            edge(3, 7, 0.5),
        ],
    )
    .expect("ring fixture builds")
}

/// All-pairs shortest path costs by Floyd-Warshall, as an oracle.
fn all_pairs_shortest(graph: &Graph) -> HashMap<(NodeId, NodeId), f64> {
    let mut ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    ids.sort_unstable();

    let mut dist: HashMap<(NodeId, NodeId), f64> = HashMap::new();
    for &a in &ids {
        dist.insert((a, a), 0.0);
        for e in graph.neighbours(a) {
            let slot = dist.entry((a, e.target)).or_insert(f64::INFINITY);
            if e.length < *slot {
                *slot = e.length;
            }
        }
    }
    for &k in &ids {
        for &i in &ids {
            for &j in &ids {
                let through = dist.get(&(i, k)).copied().unwrap_or(f64::INFINITY)
                    + dist.get(&(k, j)).copied().unwrap_or(f64::INFINITY);
                let slot = dist.entry((i, j)).or_insert(f64::INFINITY);
                if through < *slot {
                    *slot = through;
                }
            }
        }
    }
    dist
}

fn run(
    algorithm: &dyn SearchAlgorithm,
    graph: &Graph,
    start: NodeId,
    goal: NodeId,
) -> (SearchOutcome, Vec<StepEvent>) {
    let mut log: Vec<StepEvent> = Vec::new();
    let outcome = algorithm.run(graph, start, goal, None, &mut log, &CancelToken::new());
    (outcome, log)
}

/// Every consecutive pair in the path must be a real edge, and the edge
/// lengths must add up to the reported cost.
fn assert_path_valid(graph: &Graph, path: &[NodeId], cost: f64) {
    assert!(!path.is_empty(), "solution paths are never empty");
    let mut total = 0.0;
    for pair in path.windows(2) {
        let step = graph
            .neighbours(pair[0])
            .iter()
            .find(|e| e.target == pair[1])
            .unwrap_or_else(|| panic!("no edge {} -> {}", pair[0], pair[1]));
        total += step.length;
    }
    assert!(
        (total - cost).abs() < 1e-9,
        "edge lengths sum to {total}, reported cost {cost}"
    );
}

#[test]
fn uniform_cost_matches_floyd_warshall_on_all_pairs() {
    let graph = ring_with_chords();
    let oracle = all_pairs_shortest(&graph);

    for a in 1..=8 {
        for b in 1..=8 {
            let (outcome, _) = run(&UniformCost, &graph, a, b);
            let SearchOutcome::Solution { path, cost } = outcome else {
                panic!("ring is connected, {a} -> {b} must have a path");
            };
            assert_path_valid(&graph, &path, cost);
            let expected = oracle[&(a, b)];
            assert!(
                (cost - expected).abs() < 1e-9,
                "{a} -> {b}: got {cost}, oracle {expected}"
            );
        }
    }
}

#[test]
fn bidirectional_matches_floyd_warshall_on_all_pairs() {
    let graph = ring_with_chords();
    let oracle = all_pairs_shortest(&graph);

    for a in 1..=8 {
        for b in 1..=8 {
            let (outcome, _) = run(&Bidirectional, &graph, a, b);
            let SearchOutcome::Solution { path, cost } = outcome else {
                panic!("ring is connected, {a} -> {b} must have a path");
            };
            assert_path_valid(&graph, &path, cost);
            let expected = oracle[&(a, b)];
            assert!(
                (cost - expected).abs() < 1e-9,
                "{a} -> {b}: got {cost}, oracle {expected}"
            );
        }
    }
}

/// Positions drawn on a small patch of the globe; every edge is longer than
/// the straight line between its endpoints, so the haversine estimate never
/// overshoots and informed search stays optimal.
fn geographic_graph() -> Graph {
    let nodes = vec![
        positioned(1, 40.000, 44.000),
        positioned(2, 40.010, 44.000),
        positioned(3, 40.010, 44.012),
        positioned(4, 40.000, 44.012),
        positioned(5, 40.005, 44.006),
    ];
    let position = |id: NodeId| nodes.iter().find(|n| n.id == id).unwrap().position;
    let stretch = |a: NodeId, b: NodeId, factor: f64| {
        edge(a, b, position(a).haversine_to(&position(b)) * factor)
    };
    let edges = vec![
        stretch(1, 2, 1.15),
        stretch(2, 3, 1.2),
        stretch(3, 4, 1.15),
        stretch(4, 1, 1.2),
        stretch(1, 5, 1.05),
        stretch(5, 3, 1.05),
        stretch(2, 5, 1.4),
    ];
    Graph::build(false, nodes, edges).expect("geographic fixture builds")
}

#[test]
fn astar_with_haversine_matches_uniform_cost_on_all_pairs() {
    let graph = geographic_graph();

    for a in 1..=5 {
        for b in 1..=5 {
            let (ucs, _) = run(&UniformCost, &graph, a, b);
            let mut log: Vec<StepEvent> = Vec::new();
            let astar = AStar.run(
                &graph,
                a,
                b,
                Some(heuristics::haversine(&graph, b)),
                &mut log,
                &CancelToken::new(),
            );
            let SearchOutcome::Solution { cost: ucs_cost, .. } = ucs else {
                panic!("{a} -> {b} must have a path");
            };
            let SearchOutcome::Solution { cost, path } = astar else {
                panic!("{a} -> {b} must have a path");
            };
            assert_path_valid(&graph, &path, cost);
            assert!(
                (ucs_cost - cost).abs() < 1e-9,
                "{a} -> {b}: ucs {ucs_cost}, astar {cost}"
            );
        }
    }
}

#[test]
fn breadth_first_minimises_hops_on_uniform_weights() {
    // Five-node cycle, unit weights. Two hops beat three around the back.
    let graph = Graph::build(
        false,
        (1..=5).map(node).collect(),
        vec![
            edge(1, 2, 1.0),
            edge(2, 3, 1.0),
            edge(3, 4, 1.0),
            edge(4, 5, 1.0),
            edge(5, 1, 1.0),
        ],
    )
    .expect("cycle fixture builds");

    let (outcome, _) = run(&BreadthFirstGraph, &graph, 1, 3);
    assert_eq!(
        outcome,
        SearchOutcome::Solution {
            path: vec![1, 2, 3],
            cost: 2.0
        }
    );
}

#[test]
fn breadth_first_is_complete_but_not_optimal_on_weights() {
    let graph = ring_with_chords();
    let oracle = all_pairs_shortest(&graph);

    let (outcome, _) = run(&BreadthFirstGraph, &graph, 1, 6);
    let SearchOutcome::Solution { path, cost } = outcome else {
        panic!("1 -> 6 must have a path");
    };
    assert_path_valid(&graph, &path, cost);
    // Complete, but hop-minimal routes may cost more than the oracle.
    assert!(cost >= oracle[&(1, 6)] - 1e-9);
}

#[test]
fn depth_first_graph_completes_on_cyclic_input() {
    let graph = ring_with_chords();
    for goal in 2..=8 {
        let (outcome, log) = run(&DepthFirstGraph, &graph, 1, goal);
        let SearchOutcome::Solution { path, cost } = outcome else {
            panic!("1 -> {goal} must have a path");
        };
        assert_path_valid(&graph, &path, cost);
        assert_eq!(log.last().expect("log non-empty").event, StepKind::GoalFound);
    }
}

#[test]
fn depth_first_tree_terminates_on_acyclic_input() {
    let graph = Graph::build(
        true,
        (1..=6).map(node).collect(),
        vec![
            edge(1, 2, 1.0),
            edge(1, 3, 1.0),
            edge(2, 4, 1.0),
            edge(3, 4, 1.0),
            edge(4, 5, 1.0),
            edge(5, 6, 1.0),
        ],
    )
    .expect("dag fixture builds");

    let (outcome, _) = run(&DepthFirstTree, &graph, 1, 6);
    assert!(outcome.is_solution());

    let (outcome, log) = run(&BreadthFirstTree, &graph, 1, 6);
    assert!(outcome.is_solution());
    assert_eq!(log.last().expect("log non-empty").event, StepKind::GoalFound);
}

#[test]
fn start_equals_goal_is_a_two_event_log_for_every_algorithm() {
    let graph = ring_with_chords();
    let algorithms: Vec<Box<dyn SearchAlgorithm>> = vec![
        Box::new(BreadthFirstGraph),
        Box::new(BreadthFirstTree),
        Box::new(DepthFirstGraph),
        Box::new(DepthFirstTree),
        Box::new(UniformCost),
        Box::new(AStar),
        Box::new(Bidirectional),
    ];

    for algorithm in &algorithms {
        let (outcome, log) = run(algorithm.as_ref(), &graph, 4, 4);
        assert_eq!(
            outcome,
            SearchOutcome::Solution {
                path: vec![4],
                cost: 0.0
            }
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].event, StepKind::Expand);
        assert_eq!(log[0].current_node, Some(4));
        assert_eq!(log[1].event, StepKind::GoalFound);
        assert_eq!(log[1].solution_path.as_deref(), Some(&[4][..]));
    }
}

#[test]
fn unreachable_goal_ends_with_no_solution() {
    let graph = Graph::build(
        true,
        vec![node(1), node(2), node(3)],
        vec![edge(1, 2, 1.0), edge(2, 3, 1.0)],
    )
    .expect("directed line builds");

    // Edges only point forward, so the reverse direction is unreachable.
    for algorithm in [&UniformCost as &dyn SearchAlgorithm, &BreadthFirstGraph, &Bidirectional] {
        let (outcome, log) = run(algorithm, &graph, 3, 1);
        assert_eq!(outcome, SearchOutcome::Exhausted);
        assert_eq!(log.last().expect("log non-empty").event, StepKind::NoSolution);
    }
}

#[test]
fn expanded_deltas_are_unique_for_graph_searches() {
    let graph = ring_with_chords();
    for algorithm in [
        &BreadthFirstGraph as &dyn SearchAlgorithm,
        &DepthFirstGraph,
        &UniformCost,
        &Bidirectional,
    ] {
        let (_, log) = run(algorithm, &graph, 1, 6);
        let mut seen: HashSet<NodeId> = HashSet::new();
        for event in log.iter().filter(|e| e.event == StepKind::Expand) {
            for &state in event.expanded_delta.as_deref().unwrap_or(&[]) {
                assert!(seen.insert(state), "state {state} reported expanded twice");
            }
        }
        assert!(!seen.is_empty());
    }
}

#[test]
fn tree_searches_report_empty_expanded_deltas() {
    let graph = Graph::build(
        true,
        vec![node(1), node(2), node(3)],
        vec![edge(1, 2, 1.0), edge(2, 3, 1.0)],
    )
    .expect("directed line builds");

    let (_, log) = run(&BreadthFirstTree, &graph, 1, 3);
    for event in log.iter().filter(|e| e.event == StepKind::Expand) {
        assert_eq!(event.expanded_delta.as_deref(), Some(&[][..]));
    }
}

#[test]
fn event_cadence_pairs_expansions_with_frontier_updates() {
    let graph = ring_with_chords();
    for (algorithm, goal) in [
        (&UniformCost as &dyn SearchAlgorithm, 6),
        (&BreadthFirstGraph, 6),
        (&DepthFirstGraph, 6),
    ] {
        let (_, log) = run(algorithm, &graph, 1, goal);
        let expands = log.iter().filter(|e| e.event == StepKind::Expand).count();
        let updates = log
            .iter()
            .filter(|e| e.event == StepKind::FrontierUpdate)
            .count();
        // The goal expansion ends in goal_found instead of a frontier update.
        assert_eq!(updates, expands - 1);
        assert_eq!(log[0].event, StepKind::Expand);
        assert_eq!(log[0].current_node, Some(1));
        assert_eq!(log.last().expect("log non-empty").event, StepKind::GoalFound);
    }
}

#[test]
fn identical_runs_produce_identical_logs() {
    let graph = ring_with_chords();
    for algorithm in [
        &UniformCost as &dyn SearchAlgorithm,
        &BreadthFirstGraph,
        &DepthFirstGraph,
        &Bidirectional,
    ] {
        let (first_outcome, first_log) = run(algorithm, &graph, 2, 7);
        let (second_outcome, second_log) = run(algorithm, &graph, 2, 7);
        assert_eq!(first_outcome, second_outcome);
        assert_eq!(first_log, second_log);
    }
}
