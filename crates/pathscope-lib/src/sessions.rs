//! Search sessions and their step logs.
//!
//! A session owns one search run on a dedicated worker thread. The worker
//! appends step events to a shared log while clients page through it with an
//! offset, so a slow consumer never blocks the search. Statuses move from
//! `running` to exactly one terminal state and never leave it; in particular
//! a cancelled session stays cancelled even when the worker raced it to a
//! solution, and its log stops growing the moment the cancel lands.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::algorithms::SearchAlgorithm;
use crate::error::{Error, Result};
use crate::events::{StepEvent, StepSink};
use crate::graph::{Graph, NodeId};
use crate::heuristics::HeuristicFn;
use crate::registry;
use crate::search::{CancelToken, SearchOutcome};
use crate::store::GraphStore;

/// Lifecycle of a session. Terminal states are sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        self != Self::Running
    }
}

/// What a client asks for when starting a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub graph_id: String,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<String>,
    pub start: String,
    pub goal: String,
}

/// One page of a session's step log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPage {
    pub steps: Vec<StepEvent>,
    pub total_steps: usize,
    pub status: SessionStatus,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct SessionState {
    status: SessionStatus,
    steps: Vec<StepEvent>,
    error: Option<String>,
    finished_at: Option<DateTime<Utc>>,
}

/// A single search run and its replayable log.
pub struct Session {
    id: String,
    graph_id: String,
    algorithm: &'static str,
    heuristic: Option<&'static str>,
    start: NodeId,
    goal: NodeId,
    created_at: DateTime<Utc>,
    cancel: CancelToken,
    state: Mutex<SessionState>,
}

impl Session {
    fn new(
        graph_id: String,
        algorithm: &'static str,
        heuristic: Option<&'static str>,
        start: NodeId,
        goal: NodeId,
    ) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::now_v7().to_string(),
            graph_id,
            algorithm,
            heuristic,
            start,
            goal,
            created_at: Utc::now(),
            cancel: CancelToken::new(),
            state: Mutex::new(SessionState {
                status: SessionStatus::Running,
                steps: Vec::new(),
                error: None,
                finished_at: None,
            }),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }

    pub fn heuristic(&self) -> Option<&'static str> {
        self.heuristic
    }

    /// Resolved start state.
    pub fn start(&self) -> NodeId {
        self.start
    }

    /// Resolved goal state.
    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> SessionStatus {
        self.lock_state().status
    }

    /// Number of step events recorded so far.
    pub fn step_count(&self) -> usize {
        self.lock_state().steps.len()
    }

    /// Page through the step log starting at `offset`. Offsets past the end
    /// yield an empty page with the current totals.
    pub fn steps_from(&self, offset: usize) -> StepPage {
        let state = self.lock_state();
        let from = offset.min(state.steps.len());
        StepPage {
            steps: state.steps[from..].to_vec(),
            total_steps: state.steps.len(),
            status: state.status,
            completed: state.status.is_terminal(),
            error: state.error.clone(),
        }
    }

    /// Request cancellation. Running sessions flip to cancelled immediately;
    /// terminal sessions are left untouched. Returns the status after the
    /// call.
    pub fn request_cancel(&self) -> SessionStatus {
        self.cancel.cancel();
        let mut state = self.lock_state();
        if state.status == SessionStatus::Running {
            state.status = SessionStatus::Cancelled;
            state.finished_at = Some(Utc::now());
            tracing::info!(session = %self.id, "search cancelled");
        }
        state.status
    }

    fn finish(&self, outcome: &SearchOutcome) {
        let mut state = self.lock_state();
        if state.status.is_terminal() {
            return;
        }
        state.status = match outcome {
            SearchOutcome::Cancelled => SessionStatus::Cancelled,
            SearchOutcome::Solution { .. } | SearchOutcome::Exhausted => SessionStatus::Completed,
        };
        state.finished_at = Some(Utc::now());
        tracing::info!(
            session = %self.id,
            status = ?state.status,
            steps = state.steps.len(),
            "search finished"
        );
    }

    fn fail(&self, message: String) {
        let mut state = self.lock_state();
        if state.status.is_terminal() {
            return;
        }
        tracing::warn!(session = %self.id, error = %message, "search failed");
        state.status = SessionStatus::Failed;
        state.error = Some(message);
        state.finished_at = Some(Utc::now());
    }

    fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.lock_state().finished_at
    }
}

/// Appends events to a session log while the session is still running.
struct SessionSink {
    session: Arc<Session>,
}

impl StepSink for SessionSink {
    fn record(&mut self, event: StepEvent) {
        let mut state = self.session.lock_state();
        if state.status == SessionStatus::Running {
            state.steps.push(event);
        }
    }
}

/// Table of live and recently finished sessions.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_sessions(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Session>>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_sessions(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Session>>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate the request, register a session, and hand the search to a
    /// worker thread. All lookup errors surface here, before any thread is
    /// spawned.
    pub fn start(&self, graphs: &GraphStore, params: &SearchParams) -> Result<Arc<Session>> {
        let graph = graphs.get(&params.graph_id)?;
        let start = graph.resolve_node(&params.start)?;
        let goal = graph.resolve_node(&params.goal)?;
        let (algorithm_info, heuristic_info) =
            registry::resolve(&params.algorithm, params.heuristic.as_deref())?;

        let session = Session::new(
            params.graph_id.clone(),
            algorithm_info.name,
            heuristic_info.map(|info| info.name),
            start,
            goal,
        );

        let algorithm = algorithm_info.build();
        let heuristic = heuristic_info.map(|info| info.build(&graph, goal));
        spawn_worker(Arc::clone(&session), graph, algorithm, heuristic)?;

        self.write_sessions()
            .insert(session.id().to_string(), Arc::clone(&session));
        tracing::info!(
            session = %session.id(),
            graph = %session.graph_id(),
            algorithm = session.algorithm(),
            "search started"
        );
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Result<Arc<Session>> {
        self.read_sessions()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownSession { id: id.to_string() })
    }

    /// Page through a session's step log.
    pub fn steps(&self, id: &str, offset: usize) -> Result<StepPage> {
        Ok(self.get(id)?.steps_from(offset))
    }

    /// Cancel a session. Idempotent; terminal sessions keep their status.
    pub fn cancel(&self, id: &str) -> Result<SessionStatus> {
        Ok(self.get(id)?.request_cancel())
    }

    /// Drop a session from the table, cancelling it first so a running
    /// worker winds down.
    pub fn remove(&self, id: &str) -> Result<()> {
        let session = self.get(id)?;
        session.request_cancel();
        self.write_sessions().remove(id);
        Ok(())
    }

    /// Drop terminal sessions that finished longer than `retention` ago.
    /// Returns how many were evicted.
    pub fn evict_finished(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut sessions = self.write_sessions();
        let before = sessions.len();
        sessions.retain(|_, session| match session.finished_at() {
            Some(finished) => finished > cutoff,
            None => true,
        });
        before - sessions.len()
    }

    /// Snapshot of every session currently held, in no particular order.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.read_sessions().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_sessions().is_empty()
    }
}

/// Run the search on a named worker thread; panics become a failed status
/// instead of tearing anything else down.
fn spawn_worker(
    session: Arc<Session>,
    graph: Arc<Graph>,
    algorithm: Box<dyn SearchAlgorithm>,
    heuristic: Option<HeuristicFn>,
) -> Result<()> {
    let name = format!("search-{}", &session.id()[..8]);
    thread::Builder::new().name(name).spawn(move || {
        let run = catch_unwind(AssertUnwindSafe(|| {
            let mut sink = SessionSink {
                session: Arc::clone(&session),
            };
            algorithm.run(
                &graph,
                session.start(),
                session.goal(),
                heuristic,
                &mut sink,
                &session.cancel,
            )
        }));
        match run {
            Ok(outcome) => session.finish(&outcome),
            Err(payload) => session.fail(panic_message(payload)),
        }
    })?;
    Ok(())
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "search worker panicked".to_string()
    }
}
