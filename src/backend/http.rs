//! HTTP client for the analysis backend.
//!
//! Both endpoints take a JSON `{ "query", "limit" }` body and answer with
//! JSON. Any non-2xx status becomes [`AnalysisError::Backend`] carrying the
//! response body verbatim.

use crate::backend::AnalysisBackend;
use crate::config::BackendConfig;
use crate::error::{AnalysisError, Result};
use crate::models::{AgentAnalysis, SimpleAnswer};
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request body shared by both endpoints.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    limit: usize,
}

/// reqwest-backed implementation of [`AnalysisBackend`].
pub struct HttpBackend {
    config: BackendConfig,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the configured backend.
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        info!("Using analysis backend at {}", config.base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Full URL for an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a query and decode the JSON answer.
    async fn post_query<T: DeserializeOwned>(&self, path: &str, query: &str, limit: usize) -> Result<T> {
        let url = self.endpoint(path);
        debug!("POST {} (limit {})", url, limit);

        let response = self
            .http_client
            .post(&url)
            .json(&QueryRequest { query, limit })
            .send()
            .await
            .map_err(|e| {
                AnalysisError::from_transport(&e, &self.config.base_url, self.config.timeout_seconds)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AnalysisError::from_transport(&e, &self.config.base_url, self.config.timeout_seconds)
        })?;

        if !status.is_success() {
            warn!("Backend returned {} for {}", status, url);
            return Err(AnalysisError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AnalysisError::Decode(e.to_string()))
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn simple_query(&self, query: &str, limit: usize) -> Result<SimpleAnswer> {
        self.post_query(&self.config.simple_path, query, limit).await
    }

    async fn agent_query(&self, query: &str, limit: usize) -> Result<AgentAnalysis> {
        self.post_query(&self.config.agent_path, query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::AGENT_FIXTURE;
    use axum::extract::State;
    use axum::http::{header, StatusCode, Uri};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_test::{assert_err, assert_ok};

    /// A request as the stub backend saw it.
    #[derive(Debug)]
    struct Received {
        path: String,
        body: serde_json::Value,
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: &'static str,
        received: Arc<Mutex<Option<oneshot::Sender<Received>>>>,
    }

    async fn answer(
        State(stub): State<Stub>,
        uri: Uri,
        Json(body): Json<serde_json::Value>,
    ) -> (StatusCode, [(header::HeaderName, &'static str); 1], &'static str) {
        if let Some(tx) = stub.received.lock().unwrap().take() {
            let _ = tx.send(Received {
                path: uri.path().to_string(),
                body,
            });
        }
        (
            stub.status,
            [(header::CONTENT_TYPE, "application/json")],
            stub.body,
        )
    }

    /// Serve both endpoints with a fixed answer; the first request is
    /// handed back through the receiver.
    async fn serve(status: StatusCode, body: &'static str) -> (String, oneshot::Receiver<Received>) {
        let (tx, rx) = oneshot::channel();
        let stub = Stub {
            status,
            body,
            received: Arc::new(Mutex::new(Some(tx))),
        };

        let app = Router::new()
            .route("/rag", post(answer))
            .route("/agent", post(answer))
            .with_state(stub);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), rx)
    }

    fn backend_for(base_url: String) -> HttpBackend {
        HttpBackend::new(BackendConfig {
            base_url,
            timeout_seconds: 5,
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joining() {
        let backend = backend_for("http://127.0.0.1:8000/".to_string());
        assert_eq!(backend.endpoint("/rag"), "http://127.0.0.1:8000/rag");
        assert_eq!(backend.endpoint("agent"), "http://127.0.0.1:8000/agent");
    }

    #[tokio::test]
    async fn test_simple_query_success() {
        let (url, received) =
            serve(StatusCode::OK, r#"{"answer":"**Apple** is a hardware company."}"#).await;
        let backend = backend_for(url);

        let answer = assert_ok!(backend.simple_query("Apple", 5).await);
        assert_eq!(answer.answer, "**Apple** is a hardware company.");

        let request = received.await.unwrap();
        assert_eq!(request.path, "/rag");
        assert_eq!(request.body, serde_json::json!({ "query": "Apple", "limit": 5 }));
    }

    #[tokio::test]
    async fn test_agent_query_success() {
        let (url, received) = serve(StatusCode::OK, AGENT_FIXTURE).await;
        let backend = backend_for(url);

        let analysis = assert_ok!(backend.agent_query("Apple", 3).await);
        assert_eq!(analysis.ticker, "AAPL");

        let request = received.await.unwrap();
        assert_eq!(request.path, "/agent");
        assert_eq!(request.body["limit"], 3);
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let (url, _received) =
            serve(StatusCode::INTERNAL_SERVER_ERROR, "agent pipeline exploded").await;
        let backend = backend_for(url);

        let err = assert_err!(backend.agent_query("AAPL", 3).await);
        assert_eq!(
            err,
            AnalysisError::Backend {
                status: 500,
                body: "agent pipeline exploded".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_unexpected_payload_is_decode_error() {
        let (url, _received) = serve(StatusCode::OK, r#"{"unexpected":true}"#).await;
        let backend = backend_for(url);

        let err = assert_err!(backend.agent_query("AAPL", 3).await);
        assert!(matches!(err, AnalysisError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend_for(format!("http://{}", addr));
        let err = assert_err!(backend.simple_query("AAPL", 5).await);
        assert!(matches!(err, AnalysisError::Network(_)));
    }
}
