// GET /api/v1/history: most recent predictions, newest first.
//
// Optional ?limit= parameter (default 20, max 500).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::web::{api_error, AppState};

pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 500;

#[derive(Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    match state.db.fetch_history(limit).await {
        Ok(items) => Json(serde_json::json!({ "items": items })).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read prediction history");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to read history")
        }
    }
}
