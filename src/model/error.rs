// Error taxonomy for model loading and inference.
//
// Load failures are never returned to the Scorer's constructor caller; they
// become the Unloaded state. PredictError is what `predict` hands back.
// AttributionUnavailable stays inside the crate's scoring path and only ever
// turns into an absent `top_tokens`.

use std::path::PathBuf;

use thiserror::Error;

use crate::text::NormalizerError;

/// Why the artifact bundle could not be loaded.
#[derive(Debug, Clone, Error)]
pub enum LoadFailure {
    #[error("artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("failed to read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("failed to parse {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("invalid model artifacts: {0}")]
    Invalid(String),

    #[error("checksum mismatch for {}: metadata says {expected}, file hashes to {found}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("normalizer profile rejected: {0}")]
    Normalizer(#[from] NormalizerError),
}

/// Failure of a single `predict` call.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The scorer is Unloaded. Callers should treat this as "try again later".
    #[error("model artifacts not loaded")]
    ModelNotLoaded,

    /// Something unexpected went wrong while vectorizing or scoring this input.
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

impl PredictError {
    /// True when the same request may succeed once a model is available.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PredictError::ModelNotLoaded)
    }
}

/// Why top-token attribution could not be produced for a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttributionUnavailable {
    #[error("classifier exposes no per-feature coefficients")]
    NoCoefficients,

    #[error("vectorizer has no complete index-to-token map")]
    NoFeatureNames,

    #[error("coefficient width {coefficients} does not match {features} features")]
    WidthMismatch { coefficients: usize, features: usize },

    #[error("non-finite coefficient at feature {0}")]
    NonFiniteWeight(usize),
}
