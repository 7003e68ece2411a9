//! Presentation selection.
//!
//! Maps the request state and the active mode to exactly one body view,
//! plus an optional error banner shown above it.

pub mod messages;

use crate::models::{AgentAnalysis, AnalysisResult, Mode};
use crate::session::state::RequestState;

/// Loading placeholder flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingVariant {
    /// Short placeholder for simple answers.
    Simple,
    /// Full multi-section skeleton for agent analyses.
    Full,
}

impl From<Mode> for LoadingVariant {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Simple => LoadingVariant::Simple,
            Mode::Agent => LoadingVariant::Full,
        }
    }
}

/// The main area of the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Body<'a> {
    Loading(LoadingVariant),
    Structured(&'a AgentAnalysis),
    Text(&'a str),
    Empty(&'static str),
}

/// Everything to draw for one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen<'a> {
    /// Error banner text, shown alongside the body.
    pub error: Option<String>,
    pub body: Body<'a>,
}

/// Select what to show for `state` in `mode`.
///
/// Loading always wins. A failure adds an error banner over the body. Mode
/// decides between structured and plain rendering; a missing result, or a
/// result of the other kind, shows the empty placeholder.
pub fn select(state: &RequestState, mode: Mode) -> Screen<'_> {
    let empty = Body::Empty(messages::EMPTY_RESPONSE);

    match state {
        RequestState::Loading { .. } => Screen {
            error: None,
            body: Body::Loading(LoadingVariant::from(mode)),
        },
        RequestState::Failed(err) => Screen {
            error: Some(err.to_string()),
            body: empty,
        },
        RequestState::Success(result) => {
            let body = match (mode, result) {
                (Mode::Agent, AnalysisResult::Structured(analysis)) => Body::Structured(analysis),
                (Mode::Simple, AnalysisResult::Simple(text)) if !text.is_empty() => {
                    Body::Text(text.as_str())
                }
                _ => empty,
            };
            Screen { error: None, body }
        }
        RequestState::Idle => Screen {
            error: None,
            body: empty,
        },
    }
}
