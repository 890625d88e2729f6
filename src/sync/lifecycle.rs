//! Per-problem lifecycle: `Draft -> Constructing -> Constructed -> Training -> Trained`.
//!
//! DESIGN
//! ======
//! Each submission takes a [`Ticket`] carrying a tracker-wide sequence
//! number. The problem records the sequence of its one in-flight request;
//! completing a ticket whose sequence no longer matches (because the request
//! was cancelled, or the problem moved on) is rejected as stale and changes
//! nothing. That is the only guard against a late response overwriting a
//! newer state.
//!
//! Failure edges: `Constructing -> Draft` so construction can be retried,
//! `Training -> Constructed` so training can be retried. Cancellation
//! takes the same edges.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::collections::HashMap;

use serde::Serialize;

use super::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemState {
    Draft,
    Constructing,
    Constructed,
    Training,
    Trained,
}

impl std::fmt::Display for ProblemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Constructing => "constructing",
            Self::Constructed => "constructed",
            Self::Training => "training",
            Self::Trained => "trained",
        };
        f.write_str(name)
    }
}

/// Which backend exchange a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Construct,
    Train,
}

/// Claim on a problem's single in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub problem_id: String,
    pub phase: Phase,
    pub seq: u64,
}

#[derive(Debug)]
struct Entry {
    state: ProblemState,
    in_flight: Option<u64>,
}

/// Lifecycle state for every problem seen in this session.
///
/// Entries live until [`ProblemTracker::forget`] drops them; the tracker is
/// owned by one editing session and goes away with it.
#[derive(Debug, Default)]
pub struct ProblemTracker {
    problems: HashMap<String, Entry>,
    next_seq: u64,
}

impl ProblemTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `problem_id` as a draft. No effect if it is already tracked.
    pub fn register(&mut self, problem_id: &str) {
        self.problems
            .entry(problem_id.to_string())
            .or_insert(Entry { state: ProblemState::Draft, in_flight: None });
    }

    #[must_use]
    pub fn state(&self, problem_id: &str) -> Option<ProblemState> {
        self.problems.get(problem_id).map(|e| e.state)
    }

    /// `Draft -> Constructing`. Unknown problems are registered first.
    ///
    /// # Errors
    ///
    /// `SubmissionInFlight` while a construct is outstanding; `InvalidState`
    /// once the problem is past `Draft`.
    pub fn begin_construct(&mut self, problem_id: &str) -> Result<Ticket, SyncError> {
        self.register(problem_id);
        let seq = self.next_seq + 1;
        let entry = self.entry_mut(problem_id)?;
        match entry.state {
            ProblemState::Draft => {}
            ProblemState::Constructing => return Err(SyncError::SubmissionInFlight(problem_id.to_string())),
            state => return Err(invalid(problem_id, state, "construct")),
        }
        entry.state = ProblemState::Constructing;
        entry.in_flight = Some(seq);
        self.next_seq = seq;
        Ok(Ticket { problem_id: problem_id.to_string(), phase: Phase::Construct, seq })
    }

    /// `Constructed -> Training`.
    ///
    /// # Errors
    ///
    /// `NotConstructed` for an untracked problem, `SubmissionInFlight` while
    /// a train is outstanding, and `InvalidState` from any other state.
    pub fn begin_train(&mut self, problem_id: &str) -> Result<Ticket, SyncError> {
        let seq = self.next_seq + 1;
        let Some(entry) = self.problems.get_mut(problem_id) else {
            return Err(SyncError::NotConstructed(problem_id.to_string()));
        };
        match entry.state {
            ProblemState::Constructed => {}
            ProblemState::Training => return Err(SyncError::SubmissionInFlight(problem_id.to_string())),
            state => return Err(invalid(problem_id, state, "train")),
        }
        entry.state = ProblemState::Training;
        entry.in_flight = Some(seq);
        self.next_seq = seq;
        Ok(Ticket { problem_id: problem_id.to_string(), phase: Phase::Train, seq })
    }

    /// Apply the outcome of the request behind `ticket`.
    ///
    /// # Errors
    ///
    /// `StaleResponse` if the ticket is no longer the problem's in-flight
    /// request; state is left untouched.
    pub fn finish(&mut self, ticket: &Ticket, succeeded: bool) -> Result<ProblemState, SyncError> {
        let entry = self.current_entry(ticket)?;
        entry.state = match (ticket.phase, succeeded) {
            (Phase::Construct, true) => ProblemState::Constructed,
            (Phase::Construct, false) => ProblemState::Draft,
            (Phase::Train, true) => ProblemState::Trained,
            (Phase::Train, false) => ProblemState::Constructed,
        };
        entry.in_flight = None;
        Ok(entry.state)
    }

    /// Abandon the request behind `ticket`, rolling back to the
    /// pre-submission state. Returns false if the ticket was already stale.
    pub fn cancel(&mut self, ticket: &Ticket) -> bool {
        let Ok(entry) = self.current_entry(ticket) else {
            return false;
        };
        rollback(entry);
        true
    }

    /// Abandon whatever request is in flight for `problem_id`. Its eventual
    /// response will be stale. Returns false if nothing was in flight.
    pub fn cancel_problem(&mut self, problem_id: &str) -> bool {
        match self.problems.get_mut(problem_id) {
            Some(entry) if entry.in_flight.is_some() => {
                rollback(entry);
                true
            }
            _ => false,
        }
    }

    /// Stop tracking `problem_id`. A problem with a request in flight is
    /// kept; returns whether an entry was removed.
    pub fn forget(&mut self, problem_id: &str) -> bool {
        match self.problems.get(problem_id) {
            Some(entry) if entry.in_flight.is_none() => {
                self.problems.remove(problem_id);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    fn entry_mut(&mut self, problem_id: &str) -> Result<&mut Entry, SyncError> {
        self.problems
            .get_mut(problem_id)
            .ok_or_else(|| SyncError::NotConstructed(problem_id.to_string()))
    }

    fn current_entry(&mut self, ticket: &Ticket) -> Result<&mut Entry, SyncError> {
        let stale = || SyncError::StaleResponse { problem_id: ticket.problem_id.clone(), seq: ticket.seq };
        let entry = self.problems.get_mut(&ticket.problem_id).ok_or_else(stale)?;
        if entry.in_flight != Some(ticket.seq) {
            return Err(stale());
        }
        Ok(entry)
    }
}

fn rollback(entry: &mut Entry) {
    entry.state = match entry.state {
        ProblemState::Constructing => ProblemState::Draft,
        ProblemState::Training => ProblemState::Constructed,
        other => other,
    };
    entry.in_flight = None;
}

fn invalid(problem_id: &str, state: ProblemState, action: &'static str) -> SyncError {
    SyncError::InvalidState { problem_id: problem_id.to_string(), state, action }
}
