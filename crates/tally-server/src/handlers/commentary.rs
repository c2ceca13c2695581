//! Commentary handlers
//!
//! Commentary is best effort: a missing or failing backend is reported as
//! `"status": "unavailable"` for that panel with a 200, never as a server
//! error, so charts render regardless.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use tally_core::{CommentaryRequest, Panel, PanelCommentary, PanelSnapshot, Period};

use super::PeriodQuery;
use crate::{AppError, AppState};

fn commentary_json(panel: Panel, period: Period, commentary: &PanelCommentary) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(commentary)?;
    if let Value::Object(map) = &mut value {
        map.insert("panel".to_string(), Value::String(panel.to_string()));
        map.insert("period".to_string(), Value::String(period.to_string()));
    }
    Ok(value)
}

/// GET /api/commentary/:panel?period= - Generate commentary for one panel
pub async fn get_commentary(
    State(state): State<Arc<AppState>>,
    Path(panel): Path<String>,
    Query(params): Query<PeriodQuery>,
) -> Result<Json<Value>, AppError> {
    let panel: Panel = panel
        .parse()
        .map_err(|e: tally_core::Error| AppError::bad_request(&e.to_string()))?;
    let period = AppState::parse_period(params.period.as_deref())?;
    let dashboard = state.dashboard(period);
    let period = dashboard.period;

    let Some(client) = state.ai.as_ref() else {
        let unavailable = PanelCommentary::Unavailable {
            reason: "commentary backend not configured".to_string(),
        };
        return Ok(Json(commentary_json(panel, period, &unavailable)?));
    };

    let commentary = match CommentaryRequest::for_panel(&dashboard, panel)? {
        Some(request) => state.board.request(client, &request).await,
        None => {
            state.board.clear(panel, period);
            PanelCommentary::NoData
        }
    };

    Ok(Json(commentary_json(panel, period, &commentary)?))
}

/// GET /api/commentary - Latest commentary state of every panel
pub async fn list_commentary(State(state): State<Arc<AppState>>) -> Json<Vec<PanelSnapshot>> {
    Json(state.board.snapshot())
}
