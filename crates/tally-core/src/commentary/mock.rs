//! Mock backend for testing
//!
//! Returns predictable commentary without a running LLM server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{CommentaryBackend, CommentaryRequest};

/// Mock commentary backend
#[derive(Clone, Debug, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether generate should fail
    pub failing: bool,
    /// Artificial latency before answering
    pub delay: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self::default()
    }

    /// Create a backend whose every generation fails
    pub fn failing() -> Self {
        Self {
            healthy: true,
            failing: true,
            delay: None,
        }
    }

    /// Delay every response by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl CommentaryBackend for MockBackend {
    async fn generate(&self, request: &CommentaryRequest) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing {
            return Err(Error::Generation("mock backend failure".into()));
        }

        Ok(format!(
            "Mock commentary for {} in {}.",
            request.panel, request.period
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
