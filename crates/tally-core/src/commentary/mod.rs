//! Pluggable text-generation backends for panel commentary
//!
//! Every chart panel can carry a short piece of generated commentary. The
//! engine only produces structured payloads ([`CommentaryRequest`]); turning
//! them into prose is delegated to a backend.
//!
//! # Architecture
//!
//! - `CommentaryBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//! - `CommentaryBoard`: per-panel state where only the latest request may land
//!
//! # Configuration
//!
//! Environment variables (see also [`crate::config`]):
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Default model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod board;
mod mock;
mod ollama;
mod openai_compatible;
mod payload;

pub use board::{CommentaryBoard, PanelCommentary, PanelSnapshot, Ticket};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use payload::{CommentaryRequest, Panel};

use std::time::Duration;

use async_trait::async_trait;

use crate::config::AiConfig;
use crate::error::Result;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Trait defining the interface for all commentary backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait CommentaryBackend: Send + Sync {
    /// Generate commentary text for one panel
    async fn generate(&self, request: &CommentaryRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete commentary client enum
#[derive(Clone, Debug)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Build a client from resolved configuration
    ///
    /// Returns None when the selected backend has no host configured.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let backend = config.backend.to_lowercase();

        match backend.as_str() {
            "ollama" => Self::ollama_from_config(config, timeout),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                let host = config.host.as_deref()?;
                let model = config.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL);
                Some(AIClient::OpenAICompatible(OpenAICompatibleBackend::new(
                    host,
                    model,
                    config.api_key.clone(),
                    timeout,
                )))
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            "none" | "off" => None,
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                Self::ollama_from_config(config, timeout)
            }
        }
    }

    fn ollama_from_config(config: &AiConfig, timeout: Duration) -> Option<Self> {
        let host = config.host.as_deref()?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
        Some(AIClient::Ollama(OllamaBackend::new(host, model, timeout)))
    }

    /// Create a client from environment variables only
    pub fn from_env() -> Option<Self> {
        let mut config = AiConfig::default();
        config.apply_env(|key| std::env::var(key).ok());
        Self::from_config(&config)
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(
            host,
            model,
            Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        ))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl CommentaryBackend for AIClient {
    async fn generate(&self, request: &CommentaryRequest) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate(request).await,
            AIClient::OpenAICompatible(b) => b.generate(request).await,
            AIClient::Mock(b) => b.generate(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
