//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{CommentaryBackend, CommentaryRequest};

/// Ollama backend
#[derive(Clone, Debug)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
        }
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl CommentaryBackend for OllamaBackend {
    async fn generate(&self, request: &CommentaryRequest) -> Result<String> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: request.prompt(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(panel = %request.panel, "Ollama response: {}", ollama_response.response);

        let text = ollama_response.response.trim();
        if text.is_empty() {
            return Err(Error::Generation("Ollama returned an empty response".into()));
        }
        Ok(text.to_string())
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commentary::Panel;
    use crate::period::{Period, YearMonth};
    use crate::test_utils::MockTextServer;

    fn request() -> CommentaryRequest {
        CommentaryRequest {
            panel: Panel::Budgets,
            period: Period::Month(YearMonth::new(2026, 5).unwrap()),
            data: serde_json::json!({ "budgets": [] }),
        }
    }

    #[test]
    fn test_request_serialization() {
        let body = OllamaRequest {
            model: "llama3.2",
            prompt: "hello".to_string(),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_with_model() {
        let backend = OllamaBackend::new("http://localhost:11434", "llama3.2", Duration::from_secs(5));
        let other = backend.with_model("gemma3");
        assert_eq!(other.model(), "gemma3");
        assert_eq!(other.host(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2", Duration::from_secs(1));
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_generate_against_mock_server() {
        let server = MockTextServer::start().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", Duration::from_secs(5));

        assert!(backend.health_check().await);
        let text = backend.generate(&request()).await.unwrap();
        assert_eq!(text, "Spending on the budgets panel for 2026-05 looks steady.");
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let server = MockTextServer::start_failing().await;
        let backend = OllamaBackend::new(&server.url(), "llama3.2", Duration::from_secs(5));

        let err = backend.generate(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
