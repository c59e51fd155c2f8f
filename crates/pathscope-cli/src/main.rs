use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pathscope_lib::{
    load_graph_file, registry, CancelToken, SearchOutcome, StepEvent, StepKind, StepSink,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pathscope graph search utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered search algorithms.
    Algorithms,
    /// List the registered heuristics.
    Heuristics,
    /// Load a graph file and report its metadata.
    GraphInfo {
        /// Path to a graph JSON file.
        file: PathBuf,
    },
    /// Run a search over a graph file and print the result.
    Search {
        /// Path to a graph JSON file.
        file: PathBuf,
        /// Registered algorithm name (see `algorithms`).
        #[arg(long)]
        algorithm: String,
        /// Start node, as a numeric id or a node name.
        #[arg(long)]
        start: String,
        /// Goal node, as a numeric id or a node name.
        #[arg(long)]
        goal: String,
        /// Registered heuristic name, required by informed algorithms.
        #[arg(long)]
        heuristic: Option<String>,
        /// Print every step event the engine emits.
        #[arg(long)]
        show_steps: bool,
        /// Emit the step log and result as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Abort after this many step events. Tree-mode searches on cyclic
        /// graphs never terminate on their own; this puts a lid on them.
        #[arg(long)]
        max_steps: Option<usize>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Algorithms => handle_algorithms(),
        Command::Heuristics => handle_heuristics(),
        Command::GraphInfo { file } => handle_graph_info(&file),
        Command::Search {
            file,
            algorithm,
            start,
            goal,
            heuristic,
            show_steps,
            json,
            max_steps,
        } => handle_search(
            &file,
            &algorithm,
            &start,
            &goal,
            heuristic.as_deref(),
            show_steps,
            json,
            max_steps,
        ),
    }
}

fn handle_algorithms() -> Result<()> {
    println!("Available algorithms:");
    for info in registry::algorithms() {
        let heuristic = if info.requires_heuristic {
            " (requires heuristic)"
        } else {
            ""
        };
        println!("- {}: {}{}", info.name, info.display_name, heuristic);
        println!("    {}", info.description);
    }
    Ok(())
}

fn handle_heuristics() -> Result<()> {
    println!("Available heuristics:");
    for info in registry::heuristics() {
        println!("- {}: {}", info.name, info.display_name);
        println!("    {}", info.description);
    }
    Ok(())
}

fn handle_graph_info(file: &Path) -> Result<()> {
    let (meta, graph) = load_graph_file(file)
        .with_context(|| format!("failed to load graph from {}", file.display()))?;

    println!("Graph: {} ({})", meta.name, meta.graph_id);
    if let Some(description) = &meta.description {
        println!("  {}", description);
    }
    println!("  directed: {}", graph.directed());
    println!("  nodes: {}", meta.node_count);
    println!("  edges: {}", meta.edge_count);
    println!(
        "  bbox: lat {:.4}..{:.4}, lon {:.4}..{:.4}",
        meta.bbox.min_lat, meta.bbox.max_lat, meta.bbox.min_lon, meta.bbox.max_lon
    );
    Ok(())
}

/// Collecting sink that cancels the run once a step ceiling is hit.
struct BoundedLog {
    events: Vec<StepEvent>,
    limit: Option<usize>,
    cancel: CancelToken,
}

impl StepSink for BoundedLog {
    fn record(&mut self, event: StepEvent) {
        self.events.push(event);
        if self.limit.is_some_and(|limit| self.events.len() >= limit) {
            self.cancel.cancel();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_search(
    file: &Path,
    algorithm: &str,
    start: &str,
    goal: &str,
    heuristic: Option<&str>,
    show_steps: bool,
    json: bool,
    max_steps: Option<usize>,
) -> Result<()> {
    let (meta, graph) = load_graph_file(file)
        .with_context(|| format!("failed to load graph from {}", file.display()))?;

    let start_id = graph.resolve_node(start)?;
    let goal_id = graph.resolve_node(goal)?;
    let (algorithm_info, heuristic_info) = registry::resolve(algorithm, heuristic)?;

    tracing::debug!(
        graph = %meta.graph_id,
        algorithm = algorithm_info.name,
        start = start_id,
        goal = goal_id,
        "running search"
    );

    let cancel = CancelToken::new();
    let mut sink = BoundedLog {
        events: Vec::new(),
        limit: max_steps,
        cancel: cancel.clone(),
    };
    let estimator = heuristic_info.map(|info| info.build(&graph, goal_id));
    let outcome =
        algorithm_info
            .build()
            .run(&graph, start_id, goal_id, estimator, &mut sink, &cancel);

    if json {
        let (path, cost) = match &outcome {
            SearchOutcome::Solution { path, cost } => (Some(path.clone()), Some(*cost)),
            _ => (None, None),
        };
        let report = serde_json::json!({
            "graph_id": meta.graph_id,
            "algorithm": algorithm_info.name,
            "total_steps": sink.events.len(),
            "found": outcome.is_solution(),
            "solution_path": path,
            "path_cost": cost,
            "steps": if show_steps { Some(&sink.events) } else { None },
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        if matches!(outcome, SearchOutcome::Cancelled) {
            bail!(
                "stopped after {} steps without finding the goal",
                sink.events.len()
            );
        }
        return Ok(());
    }

    if show_steps {
        for (sequence, event) in sink.events.iter().enumerate() {
            print_step(sequence, event);
        }
    }
    println!("Steps: {}", sink.events.len());

    match outcome {
        SearchOutcome::Solution { path, cost } => {
            println!("Path found (cost {:.1} m):", cost);
            for state in path {
                match graph.node(state).and_then(|n| n.name.as_deref()) {
                    Some(name) => println!("- {} ({})", name, state),
                    None => println!("- {}", state),
                }
            }
            Ok(())
        }
        SearchOutcome::Exhausted => {
            println!("No path found between {} and {}.", start, goal);
            Ok(())
        }
        SearchOutcome::Cancelled => {
            bail!(
                "stopped after {} steps without finding the goal",
                sink.events.len()
            )
        }
    }
}

fn print_step(sequence: usize, event: &StepEvent) {
    match event.event {
        StepKind::Expand => {
            let node = event.current_node.unwrap_or_default();
            println!("[{sequence}] expand {node}");
        }
        StepKind::FrontierUpdate => {
            let frontier = format_states(event.frontier.as_deref());
            println!("[{sequence}] frontier [{frontier}]");
        }
        StepKind::GoalFound => {
            let path = format_states(event.solution_path.as_deref());
            println!("[{sequence}] goal_found [{path}]");
        }
        StepKind::NoSolution => println!("[{sequence}] no_solution"),
    }
}

fn format_states(states: Option<&[pathscope_lib::NodeId]>) -> String {
    states
        .unwrap_or(&[])
        .iter()
        .map(|state| state.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
