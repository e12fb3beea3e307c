// GET /api/v1/health: liveness plus model state.
//
// Always 200; an unloaded model shows up as `model_loaded: false`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::web::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": state.scorer.loaded(),
        "model_version": state.scorer.model_version(),
    }))
}
