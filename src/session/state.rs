//! Request state machine.
//!
//! All state changes go through [`SessionState::apply`]. Each submission is
//! tagged with a monotonically increasing [`RequestId`]; a completion is only
//! applied when it belongs to the latest submission that is still loading.
//! Anything else is reported as [`Transition::Stale`] and dropped.

use crate::error::AnalysisError;
use crate::models::{AnalysisResult, Mode};
use std::fmt;

/// Identifier of one outbound request. Strictly increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// The first id a session hands out.
    pub fn first() -> Self {
        RequestId(1)
    }

    /// The id after this one.
    pub fn next(self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What was asked: the trimmed query and the mode it was asked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub query: String,
    pub mode: Mode,
}

/// The single state record. Variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Loading {
        id: RequestId,
        submission: Submission,
    },
    Success(AnalysisResult),
    Failed(AnalysisError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RequestState::Success(result) => Some(result),
            _ => None,
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Event {
    /// A request was issued.
    Submitted {
        id: RequestId,
        submission: Submission,
    },
    /// A request finished, successfully or not.
    Completed {
        id: RequestId,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    /// Back to idle, forgetting the last submission.
    Reset,
}

/// Whether an event changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The event referred to a superseded request and was discarded.
    Stale,
}

/// State record plus the bookkeeping needed to reject stale events.
#[derive(Debug, Clone)]
pub struct SessionState {
    state: RequestState,
    latest: Option<RequestId>,
    last_submission: Option<Submission>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
            latest: None,
            last_submission: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Id of the most recently issued request.
    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    /// The submission a retry would re-issue.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    /// Apply one event.
    pub fn apply(&mut self, event: Event) -> Transition {
        match event {
            Event::Submitted { id, submission } => {
                if self.latest.is_some_and(|latest| id <= latest) {
                    return Transition::Stale;
                }
                self.latest = Some(id);
                self.last_submission = Some(submission.clone());
                self.state = RequestState::Loading { id, submission };
                Transition::Applied
            }
            Event::Completed { id, outcome } => {
                let in_flight = matches!(
                    self.state,
                    RequestState::Loading { id: loading, .. } if loading == id
                );
                if !in_flight || self.latest != Some(id) {
                    return Transition::Stale;
                }
                self.state = match outcome {
                    Ok(result) => RequestState::Success(result),
                    Err(err) => RequestState::Failed(err),
                };
                Transition::Applied
            }
            Event::Reset => {
                self.state = RequestState::Idle;
                self.last_submission = None;
                Transition::Applied
            }
        }
    }
}
