//! Dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use tally_core::{sum_amounts, CommentaryBackend, LedgerEntry, Period};

use super::PeriodQuery;
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub fingerprint: String,
    pub entries: usize,
    pub commentary: CommentaryInfo,
}

#[derive(Debug, Serialize)]
pub struct CommentaryInfo {
    pub configured: bool,
    pub host: Option<String>,
    pub model: Option<String>,
}

/// GET /api/health - Liveness plus snapshot and backend info
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.snapshot.current();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        fingerprint: store.fingerprint().to_string(),
        entries: store.ledger().len(),
        commentary: CommentaryInfo {
            configured: state.ai.is_some(),
            host: state.ai.as_ref().map(|c| c.host().to_string()),
            model: state.ai.as_ref().map(|c| c.model().to_string()),
        },
    })
}

#[derive(Debug, Serialize)]
pub struct PeriodsResponse {
    pub periods: Vec<Period>,
    pub default: Period,
}

/// GET /api/periods - Selectable periods, most recent first
pub async fn list_periods(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PeriodsResponse>, AppError> {
    let dashboard = state.dashboard(None);
    Ok(Json(PeriodsResponse {
        periods: dashboard.available_periods.clone(),
        default: dashboard.period,
    }))
}

/// GET /api/dashboard?period= - Every derived view for one period
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let period = AppState::parse_period(params.period.as_deref())?;
    let dashboard = state.dashboard(period);
    Ok(Json(serde_json::to_value(dashboard.as_ref())?))
}

#[derive(Debug, Serialize)]
pub struct CategoryTransactions {
    pub category: String,
    pub period: Period,
    pub total: i64,
    pub transactions: Vec<LedgerEntry>,
}

/// GET /api/categories/:name/transactions?period= - Click-through detail
///
/// An unknown category is an empty list, not an error.
pub async fn get_category_transactions(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<CategoryTransactions>, AppError> {
    let period = AppState::parse_period(params.period.as_deref())?;
    let dashboard = state.dashboard(period);
    let transactions = dashboard.detail(&name);

    Ok(Json(CategoryTransactions {
        total: sum_amounts(transactions.iter().map(|e| e.amount)),
        category: name,
        period: dashboard.period,
        transactions,
    }))
}
