//! Request orchestration.
//!
//! A [`Session`] owns the state record and the backend. Issuing a request is
//! split in three steps so callers can interleave them:
//!
//! 1. [`Session::begin`] / [`Session::begin_retry`] validate and move the
//!    state to loading, returning a [`Ticket`].
//! 2. [`Session::dispatch`] performs the backend call for a ticket.
//! 3. [`Session::complete`] feeds the outcome back through the reducer.
//!
//! [`Session::submit`] and [`Session::retry`] run all three in sequence.

use crate::backend::AnalysisBackend;
use crate::config::BackendConfig;
use crate::error::AnalysisError;
use crate::models::{AnalysisResult, Mode};
use crate::session::state::{Event, RequestId, RequestState, SessionState, Submission, Transition};
use crate::view::{self, Screen};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-mode context limits sent with each query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub simple: usize,
    pub agent: usize,
}

impl QueryLimits {
    pub fn for_mode(&self, mode: Mode) -> usize {
        match mode {
            Mode::Simple => self.simple,
            Mode::Agent => self.agent,
        }
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

impl From<&BackendConfig> for QueryLimits {
    fn from(config: &BackendConfig) -> Self {
        Self {
            simple: config.limit_for(Mode::Simple),
            agent: config.limit_for(Mode::Agent),
        }
    }
}

/// An issued request waiting to be dispatched.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: RequestId,
    pub submission: Submission,
    started: Instant,
}

/// Outcome of a dispatched ticket, ready for [`Session::complete`].
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Result<AnalysisResult, AnalysisError>,
}

/// Client-side request orchestrator.
pub struct Session<B> {
    backend: B,
    limits: QueryLimits,
    mode: Mode,
    state: SessionState,
    next_id: RequestId,
}

impl<B: AnalysisBackend> Session<B> {
    /// Create an idle session.
    pub fn new(backend: B, limits: QueryLimits, mode: Mode) -> Self {
        Self {
            backend,
            limits,
            mode,
            state: SessionState::new(),
            next_id: RequestId::first(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &RequestState {
        self.state.state()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading()
    }

    /// The submission a retry would re-issue.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.state.last_submission()
    }

    /// What should be shown right now.
    pub fn screen(&self) -> Screen<'_> {
        view::select(self.state(), self.mode)
    }

    /// Switch mode. Refused while a request is loading; never issues a request.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        if self.is_loading() {
            debug!("Mode change to {} ignored while loading", mode);
            return false;
        }
        self.mode = mode;
        true
    }

    /// Flip between simple and agent mode.
    pub fn toggle_mode(&mut self) -> bool {
        self.set_mode(self.mode.toggled())
    }

    /// Start a request for `query` in the current mode.
    ///
    /// Returns `None` without touching the state when the trimmed query is
    /// empty or a request is already loading.
    pub fn begin(&mut self, query: &str) -> Option<Ticket> {
        let query = query.trim();
        if query.is_empty() {
            debug!("{}", AnalysisError::EmptyQuery);
            return None;
        }
        if self.is_loading() {
            debug!("Submission ignored while a request is loading");
            return None;
        }

        let submission = Submission {
            query: query.to_string(),
            mode: self.mode,
        };
        Some(self.issue(submission))
    }

    /// Whether [`Session::begin_retry`] would issue a request.
    ///
    /// True after a failure, and while loading (an overlapping retry, in
    /// which case the newest request wins).
    pub fn can_retry(&self) -> bool {
        let retryable = matches!(
            self.state(),
            RequestState::Failed(_) | RequestState::Loading { .. }
        );
        retryable && self.last_submission().is_some()
    }

    /// Re-issue the last submission with its original query and mode.
    ///
    /// The session switches back to the submission's mode so the loading
    /// placeholder and the result are shown for the request in flight.
    pub fn begin_retry(&mut self) -> Option<Ticket> {
        if !self.can_retry() {
            debug!("Nothing to retry");
            return None;
        }

        let submission = self.last_submission()?.clone();
        if submission.mode != self.mode {
            debug!("Retry switches mode back to {}", submission.mode);
            self.mode = submission.mode;
        }
        Some(self.issue(submission))
    }

    fn issue(&mut self, submission: Submission) -> Ticket {
        let id = self.next_id;
        self.next_id = id.next();

        info!(
            "Request {}: {} query '{}'",
            id, submission.mode, submission.query
        );

        self.state.apply(Event::Submitted {
            id,
            submission: submission.clone(),
        });

        Ticket {
            id,
            submission,
            started: Instant::now(),
        }
    }

    /// Perform the backend call for a ticket.
    ///
    /// Agent results are stamped with the elapsed wall-clock time since the
    /// ticket was issued.
    pub async fn dispatch(&self, ticket: &Ticket) -> Completion {
        let Submission { query, mode } = &ticket.submission;
        let limit = self.limits.for_mode(*mode);

        let outcome = match mode {
            Mode::Simple => self
                .backend
                .simple_query(query, limit)
                .await
                .map(|answer| AnalysisResult::Simple(answer.answer)),
            Mode::Agent => self.backend.agent_query(query, limit).await.map(|mut analysis| {
                analysis.execution_time = ticket.started.elapsed().as_secs_f64();
                AnalysisResult::Structured(analysis)
            }),
        };

        Completion {
            id: ticket.id,
            outcome,
        }
    }

    /// Apply a completion. Completions of superseded requests are dropped.
    pub fn complete(&mut self, completion: Completion) -> Transition {
        let Completion { id, outcome } = completion;

        match &outcome {
            Ok(_) => info!("Request {} succeeded", id),
            Err(e) => warn!("Request {} failed: {}", id, e),
        }

        let transition = self.state.apply(Event::Completed { id, outcome });
        if transition == Transition::Stale {
            match self.state.latest() {
                Some(latest) => debug!("Discarded stale response for request {} (latest {})", id, latest),
                None => debug!("Discarded stale response for request {}", id),
            }
        }
        transition
    }

    /// Submit a query and wait for it. `None` when the submission was a no-op.
    pub async fn submit(&mut self, query: &str) -> Option<Transition> {
        let ticket = self.begin(query)?;
        Some(self.run(ticket).await)
    }

    /// Retry the last submission and wait for it. `None` when there was nothing to retry.
    pub async fn retry(&mut self) -> Option<Transition> {
        let ticket = self.begin_retry()?;
        Some(self.run(ticket).await)
    }

    async fn run(&mut self, ticket: Ticket) -> Transition {
        let completion = self.dispatch(&ticket).await;
        self.complete(completion)
    }

    /// Back to idle.
    pub fn reset(&mut self) {
        self.state.apply(Event::Reset);
    }
}
