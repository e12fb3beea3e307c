// Data models: Rust structs that map to database rows.
//
// Kept free of rusqlite types so the web and output layers can use them
// without the `sqlite` feature.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Label;
use crate::pipeline::{Classification, Document};

/// One stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub prediction_id: String,
    pub title: Option<String>,
    pub content: String,
    pub label: Label,
    /// Probability of `label`, rounded to four decimal places.
    pub probability: f64,
    pub model_version: String,
    pub top_tokens: Option<Vec<String>>,
    /// RFC 3339, UTC.
    pub created_at: String,
}

impl PredictionRecord {
    /// A fresh record for a classification, stamped now with a new v4 id.
    pub fn new(document: &Document, classification: &Classification) -> Self {
        Self {
            prediction_id: Uuid::new_v4().to_string(),
            title: document.title.clone(),
            content: document.content.clone(),
            label: classification.prediction.label,
            probability: round4(classification.prediction.probability),
            model_version: classification.model_version.clone(),
            top_tokens: classification.prediction.top_tokens.clone(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Round to four decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
