// POST /api/v1/predict: classify one document and record it.
//
// 400 invalid body or document, 503 model not loaded, 500 inference failed.
// Recording to history is best-effort: a store failure is logged and the
// prediction is still returned.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use crate::db::PredictionRecord;
use crate::model::{Label, PredictError};
use crate::pipeline::{classify_document, ClassifyError, Document};
use crate::web::{api_error, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction_id: String,
    pub label: Label,
    pub probability: f64,
    pub model_version: String,
    pub top_tokens: Option<Vec<String>>,
    pub created_at: String,
}

impl From<PredictionRecord> for PredictResponse {
    fn from(record: PredictionRecord) -> Self {
        Self {
            prediction_id: record.prediction_id,
            label: record.label,
            probability: record.probability,
            model_version: record.model_version,
            top_tokens: record.top_tokens,
            created_at: record.created_at,
        }
    }
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Document>, JsonRejection>,
) -> Response {
    let Json(document) = match body {
        Ok(body) => body,
        Err(rejection) => return api_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let scorer = state.scorer.clone();
    let max_len = state.config.max_content_length;
    let task_document = document.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        classify_document(&scorer, &task_document, max_len)
    })
    .await;

    let classification = match outcome {
        Ok(Ok(classification)) => classification,
        Ok(Err(ClassifyError::Document(e))) => {
            return api_error(StatusCode::BAD_REQUEST, &e.to_string());
        }
        Ok(Err(ClassifyError::Predict(PredictError::ModelNotLoaded))) => {
            return api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "model artifacts not loaded, try again later",
            );
        }
        Ok(Err(ClassifyError::Predict(e))) => {
            error!(error = %e, "Prediction failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "inference failed");
        }
        Err(e) => {
            error!(error = %e, "Prediction task panicked");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "inference failed");
        }
    };

    let record = PredictionRecord::new(&document, &classification);
    if let Err(e) = state.db.insert_prediction(&record).await {
        warn!(
            prediction_id = %record.prediction_id,
            error = %e,
            "Failed to store prediction in history"
        );
    }

    (StatusCode::OK, Json(PredictResponse::from(record))).into_response()
}
