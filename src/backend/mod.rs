//! Analysis backend abstraction.
//!
//! The session only talks to the backend through [`AnalysisBackend`], so the
//! HTTP client can be swapped for a scripted one in tests.

pub mod http;

pub use http::HttpBackend;

use crate::error::Result;
use crate::models::{AgentAnalysis, SimpleAnswer};
use async_trait::async_trait;

/// The two request kinds the analysis backend serves.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Free-text question, answered with a single markdown string.
    async fn simple_query(&self, query: &str, limit: usize) -> Result<SimpleAnswer>;

    /// Multi-stream analysis. The returned record has no execution time yet.
    async fn agent_query(&self, query: &str, limit: usize) -> Result<AgentAnalysis>;
}
