//! Tally Web Server
//!
//! Axum-based read-only REST API over a state snapshot:
//! - Dashboard views per period (categories, trend, budgets, forecast)
//! - Category click-through detail
//! - Per-panel commentary from a text-generation backend
//! - Restrictive CORS policy and request tracing

use std::sync::{Arc, Mutex};

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use tally_core::{
    AIClient, CommentaryBackend, CommentaryBoard, Dashboard, DashboardCache, Period, StateStore,
};

mod handlers;
mod snapshot;

pub use snapshot::SnapshotSource;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Fixed clock instead of the system time (for testing)
    pub fixed_now: Option<DateTime<Utc>>,
}

/// Shared application state
pub struct AppState {
    pub snapshot: SnapshotSource,
    pub cache: Mutex<DashboardCache>,
    pub board: Arc<CommentaryBoard>,
    pub ai: Option<AIClient>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(snapshot: SnapshotSource, ai: Option<AIClient>, config: ServerConfig) -> Self {
        Self {
            snapshot,
            cache: Mutex::new(DashboardCache::new()),
            board: Arc::new(CommentaryBoard::new()),
            ai,
            config,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.config.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Parse an optional `?period=` value
    pub fn parse_period(raw: Option<&str>) -> Result<Option<Period>, AppError> {
        raw.filter(|p| !p.is_empty())
            .map(str::parse::<Period>)
            .transpose()
            .map_err(|e| AppError::bad_request(&e.to_string()))
    }

    /// Memoized dashboard for `period` (or the default period)
    ///
    /// A cache lock poisoned by a panicking request is recovered and emptied.
    pub fn dashboard(&self, period: Option<Period>) -> Arc<Dashboard> {
        let store = self.snapshot.current();
        let now = self.now();
        let period = match period {
            Some(p) => p,
            None => default_period(&store, now),
        };

        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Dashboard cache lock poisoned, clearing cache");
            self.cache.clear_poison();
            let mut cache = poisoned.into_inner();
            cache.clear();
            cache
        });
        cache.get_or_build(&store, period, now)
    }
}

fn default_period(store: &StateStore, now: DateTime<Utc>) -> Period {
    let periods = tally_core::period::available_periods(store.ledger(), now.date_naive());
    tally_core::period::default_period(&periods, now.date_naive())
}

/// Create the application router
pub fn create_router(snapshot: SnapshotSource, ai: Option<AIClient>, config: ServerConfig) -> Router {
    match &ai {
        Some(client) => info!(
            "Commentary backend configured: {} (model: {})",
            client.host(),
            client.model()
        ),
        None => info!("ℹ️  Commentary backend not configured (set OLLAMA_HOST to enable panel commentary)"),
    }

    router_with_state(Arc::new(AppState::new(snapshot, ai, config)))
}

fn router_with_state(state: Arc<AppState>) -> Router {
    let cors = if state.config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/periods", get(handlers::list_periods))
        .route("/dashboard", get(handlers::get_dashboard))
        .route(
            "/categories/:name/transactions",
            get(handlers::get_category_transactions),
        )
        .route("/commentary", get(handlers::list_commentary))
        .route("/commentary/:panel", get(handlers::get_commentary));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(
    snapshot: SnapshotSource,
    ai: Option<AIClient>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    check_ai_connection(ai.as_ref()).await;

    let app = create_router(snapshot, ai, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log commentary backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    let Some(client) = ai else {
        return;
    };

    if client.health_check().await {
        info!(
            "✅ Commentary backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "⚠️  Commentary backend configured but not responding: {} (model: {})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}
