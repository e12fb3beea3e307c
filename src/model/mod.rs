// Model serving: artifact loading, TF-IDF vectorization, linear scoring,
// and top-token attribution.

pub mod artifacts;
pub mod attribution;
pub mod classifier;
pub mod error;
pub mod scorer;
pub mod vectorizer;

pub use artifacts::{ArtifactPaths, ModelArtifactBundle, ModelMetadata};
pub use error::{AttributionUnavailable, LoadFailure, PredictError};
pub use scorer::{Label, PredictionResult, Scorer, ScorerConfig, ScorerState, DEFAULT_FAKE_THRESHOLD};
