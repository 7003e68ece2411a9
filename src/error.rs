//! Error taxonomy for analysis requests.
//!
//! Every failure a submission can end in is one of these variants. The
//! session stores the error as-is in its failed state, so the type is
//! `Clone` and carries only owned strings.

use thiserror::Error;

/// Errors that can occur while requesting an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Transport failure: connection refused, timeout, broken stream.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP error! status: {status}, message: {body}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Response body, kept verbatim.
        body: String,
    },

    /// Success status, but the payload did not match the expected shape.
    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    /// The query was empty after trimming.
    #[error("Query must not be empty")]
    EmptyQuery,
}

impl AnalysisError {
    /// Build a network error from a reqwest failure, naming the likely cause.
    pub fn from_transport(err: &reqwest::Error, base_url: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            AnalysisError::Network(format!("Request timed out after {}s", timeout_seconds))
        } else if err.is_connect() {
            AnalysisError::Network(format!(
                "Cannot connect to analysis backend at {}. Is it running?",
                base_url
            ))
        } else {
            AnalysisError::Network(format!("Failed to send request: {}", err))
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
