//! Test utilities for tally-core
//!
//! A mock text-generation server speaking both the Ollama and the
//! OpenAI-compatible APIs, for integration tests of the commentary backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct ServerState {
    failing: bool,
    calls: AtomicUsize,
}

/// Mock text-generation server for testing and development
pub struct MockTextServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTextServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server whose generation endpoints always return 500
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let state = Arc::new(ServerState {
            failing,
            calls: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generation requests received
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTextServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Canned commentary derived from the prompt's panel line
fn commentary_for(prompt: &str) -> String {
    let panel = prompt
        .lines()
        .find_map(|line| line.strip_prefix("Panel: "))
        .unwrap_or("dashboard");
    let period = prompt
        .lines()
        .find_map(|line| line.strip_prefix("Period: "))
        .unwrap_or("all");
    format!("Spending on the {} panel for {} looks steady.", panel, period)
}

async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
        }],
    })
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "data": [{ "id": "llama3.2" }] }))
}

async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if state.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    Json(GenerateResponse {
        response: commentary_for(&request.prompt),
        model: request.model,
        done: true,
    })
    .into_response()
}

async fn handle_chat(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    if state.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response();
    }

    let prompt = request
        .messages
        .last()
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    Json(serde_json::json!({
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": commentary_for(prompt) },
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}
