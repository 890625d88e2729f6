//! Graph sync: ship canvas snapshots to the training backend.
//!
//! DESIGN
//! ======
//! [`GraphSync`] ties three pieces together: [`payload`] turns a snapshot
//! into wire form, [`lifecycle`] tracks each problem through construct and
//! train, and a [`backend::Backend`] performs the HTTP exchange.
//!
//! The tracker lives behind a std `Mutex` that is only ever locked for the
//! synchronous state transition on either side of a request, never across
//! an `.await`. A request claims a ticket before it is sent and settles the
//! ticket when the response lands; a response whose ticket was cancelled in
//! the meantime is reported as `StaleResponse` and leaves state untouched.
//!
//! The canvas store is never written by construct or train, so a backend
//! failure cannot leave the canvas in a partial state.


pub mod backend;
pub mod config;
pub mod dataset;
pub mod lifecycle;
pub mod payload;

pub use backend::{Ack, Backend, HttpBackend};
pub use config::{BackendTimeouts, SyncConfig};
pub use dataset::{DatasetSeries, DynamicalSystem, PlotRequest};
pub use lifecycle::{Phase, ProblemState, ProblemTracker, Ticket};
pub use payload::{BlockInfo, GraphNode, GraphPayload, build_payload, new_problem_id};

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use uuid::Uuid;

use crate::canvas::{CanvasError, CanvasStore, Position};
use crate::error::ErrorCode;
use crate::registry::DATASET_KIND_ID;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("canvas has no blocks to submit")]
    EmptyCanvas,

    #[error("problem {0} has not been constructed")]
    NotConstructed(String),

    #[error("cannot {action} problem {problem_id} while it is {state}")]
    InvalidState { problem_id: String, state: ProblemState, action: &'static str },

    #[error("a request for problem {0} is already in flight")]
    SubmissionInFlight(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("backend rejected request: status {status}")]
    BackendRejected { status: u16, body: String },

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request for problem {0} was cancelled")]
    Cancelled(String),

    #[error("discarded stale response for problem {problem_id} (seq {seq})")]
    StaleResponse { problem_id: String, seq: u64 },

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCanvas => "E_EMPTY_CANVAS",
            Self::NotConstructed(_) => "E_NOT_CONSTRUCTED",
            Self::InvalidState { .. } => "E_INVALID_STATE",
            Self::SubmissionInFlight(_) => "E_SUBMISSION_IN_FLIGHT",
            Self::BackendUnavailable(_) => "E_BACKEND_UNAVAILABLE",
            Self::BackendRejected { .. } => "E_BACKEND_REJECTED",
            Self::InvalidResponse(_) => "E_INVALID_RESPONSE",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::Cancelled(_) => "E_CANCELLED",
            Self::StaleResponse { .. } => "E_STALE_RESPONSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Canvas(err) => err.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Dataset block created by [`GraphSync::generate_dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDataset {
    pub instance_id: String,
    pub series: DatasetSeries,
}

/// Sync client for one editing session. Cheap to clone; clones share the
/// problem tracker.
#[derive(Clone)]
pub struct GraphSync {
    backend: Arc<dyn Backend>,
    problems: Arc<Mutex<ProblemTracker>>,
}

impl GraphSync {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend, problems: Arc::new(Mutex::new(ProblemTracker::new())) }
    }

    fn problems(&self) -> MutexGuard<'_, ProblemTracker> {
        self.problems.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn problem_state(&self, problem_id: &str) -> Option<ProblemState> {
        self.problems().state(problem_id)
    }

    /// Snapshot `store` under a fresh problem id and register it as a draft.
    ///
    /// # Errors
    ///
    /// Propagates [`build_payload`] failures; nothing is registered then.
    pub fn prepare(&self, store: &CanvasStore) -> Result<GraphPayload, SyncError> {
        let snapshot = store.snapshot();
        let payload = build_payload(&snapshot, &new_problem_id(), store.registry())?;
        self.problems().register(&payload.problem_id);
        info!(
            problem_id = %payload.problem_id,
            nodes = payload.nodes.len(),
            edges = payload.edges.len(),
            version = snapshot.version(),
            "payload prepared"
        );
        Ok(payload)
    }

    /// Construct the problem described by `payload`.
    ///
    /// # Errors
    ///
    /// See [`GraphSync::submit_construct_until`].
    pub async fn submit_construct(&self, payload: &GraphPayload) -> Result<Ack, SyncError> {
        self.submit_construct_until(payload, std::future::pending()).await
    }

    /// Construct the problem described by `payload`, abandoning the request
    /// if `cancel` completes first.
    ///
    /// # Errors
    ///
    /// `SubmissionInFlight` or `InvalidState` if the problem cannot start
    /// constructing, backend errors as reported, `Cancelled` if `cancel`
    /// won, and `StaleResponse` if the problem was cancelled elsewhere while
    /// the request was out.
    pub async fn submit_construct_until(
        &self,
        payload: &GraphPayload,
        cancel: impl Future<Output = ()>,
    ) -> Result<Ack, SyncError> {
        let ticket = self.problems().begin_construct(&payload.problem_id)?;
        info!(problem_id = %ticket.problem_id, seq = ticket.seq, "construct submitted");
        self.settle(ticket, self.backend.construct(payload), cancel)
            .await
    }

    /// Train a constructed problem.
    ///
    /// # Errors
    ///
    /// See [`GraphSync::submit_train_until`].
    pub async fn submit_train(&self, problem_id: &str) -> Result<Ack, SyncError> {
        self.submit_train_until(problem_id, std::future::pending())
            .await
    }

    /// Train a constructed problem, abandoning the request if `cancel`
    /// completes first.
    ///
    /// # Errors
    ///
    /// `NotConstructed` for a problem this client never prepared,
    /// `InvalidState` or `SubmissionInFlight` from the wrong state, then the
    /// same outcomes as construct.
    pub async fn submit_train_until(
        &self,
        problem_id: &str,
        cancel: impl Future<Output = ()>,
    ) -> Result<Ack, SyncError> {
        let ticket = self.problems().begin_train(problem_id)?;
        info!(problem_id = %ticket.problem_id, seq = ticket.seq, "train submitted");
        self.settle(ticket, self.backend.train(problem_id), cancel)
            .await
    }

    /// Abandon whatever request is in flight for `problem_id`. Returns false
    /// if nothing was in flight.
    pub fn cancel(&self, problem_id: &str) -> bool {
        let cancelled = self.problems().cancel_problem(problem_id);
        if cancelled {
            warn!(problem_id, "in-flight request cancelled");
        }
        cancelled
    }

    /// Drop a settled problem from the tracker. Problems with a request in
    /// flight are kept. Returns whether anything was dropped.
    pub fn forget(&self, problem_id: &str) -> bool {
        self.problems().forget(problem_id)
    }

    async fn settle(
        &self,
        ticket: Ticket,
        request: impl Future<Output = Result<Ack, SyncError>>,
        cancel: impl Future<Output = ()>,
    ) -> Result<Ack, SyncError> {
        let outcome = tokio::select! {
            result = request => result,
            () = cancel => {
                self.problems().cancel(&ticket);
                warn!(problem_id = %ticket.problem_id, seq = ticket.seq, phase = ?ticket.phase, "request cancelled");
                return Err(SyncError::Cancelled(ticket.problem_id));
            }
        };

        let settled = self.problems().finish(&ticket, outcome.is_ok());
        let state = match settled {
            Ok(state) => state,
            Err(stale) => {
                warn!(problem_id = %ticket.problem_id, seq = ticket.seq, "stale response discarded");
                return Err(stale);
            }
        };

        match &outcome {
            Ok(ack) => info!(problem_id = %ticket.problem_id, status = ack.status, %state, "backend accepted"),
            Err(e) => warn!(problem_id = %ticket.problem_id, error = %e, %state, "backend request failed"),
        }
        outcome
    }

    /// Simulate `system` on the backend and drop the resulting dataset on
    /// the canvas at `position`. The block's instance id is the id the
    /// backend stored the data under.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for zero simulations, backend errors as reported.
    /// The canvas is only touched once the backend has answered.
    pub async fn generate_dataset(
        &self,
        store: &CanvasStore,
        system: DynamicalSystem,
        num_simulations: u32,
        position: Position,
    ) -> Result<GeneratedDataset, SyncError> {
        let instance_id = format!("dataset_{}", Uuid::new_v4().simple());
        let request = PlotRequest::new(instance_id.clone(), system, num_simulations)?;
        let series = self.backend.plot_system(&request).await?;
        store.place_block_with_id(&instance_id, DATASET_KIND_ID, position, Some(system.as_str()))?;
        info!(instance_id = %instance_id, %system, points = series.points.len(), "dataset generated");
        Ok(GeneratedDataset { instance_id, series })
    }
}
