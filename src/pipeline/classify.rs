// Single-document classification: validate, combine, normalize, predict.

use serde::Serialize;
use thiserror::Error;

use super::document::{Document, DocumentError};
use crate::model::{PredictError, PredictionResult, Scorer};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid document: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// A prediction together with what produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub model_version: String,
    pub normalized: String,
}

pub fn classify_document(
    scorer: &Scorer,
    document: &Document,
    max_content_chars: usize,
) -> Result<Classification, ClassifyError> {
    document.validate(max_content_chars)?;

    // Normalize with the profile the model was trained on.
    let (normalizer, model_version) = match (scorer.normalizer(), scorer.model_version()) {
        (Some(normalizer), Some(version)) => (normalizer, version),
        _ => return Err(PredictError::ModelNotLoaded.into()),
    };

    let normalized = normalizer.normalize(&document.combined());
    let prediction = scorer.predict(&normalized)?;

    Ok(Classification {
        prediction,
        model_version: model_version.to_string(),
        normalized,
    })
}
