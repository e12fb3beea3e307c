// Scorer: owns the loaded artifact bundle and turns normalized text into a
// labeled prediction.
//
// Loading happens once, in `Scorer::load`, and never fails outward: a bad or
// missing bundle leaves the scorer Unloaded with the reason recorded. A new
// Scorer is needed to pick up new artifacts.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::artifacts::{load_bundle, ArtifactPaths, ModelArtifactBundle};
use super::attribution::{top_tokens, TOP_K};
use super::error::{AttributionUnavailable, LoadFailure, PredictError};
use crate::text::{Normalizer, NormalizerProfile};

/// Default probability mass on FAKE needed to label a document FAKE.
pub const DEFAULT_FAKE_THRESHOLD: f64 = 0.6;

/// The two classes every served model must predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REAL" => Ok(Label::Real),
            "FAKE" => Ok(Label::Fake),
            other => Err(format!("unknown label: {other}")),
        }
    }
}

/// One prediction, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,
    /// Probability of `label`, in [0, 1].
    pub probability: f64,
    /// Up to six vocabulary terms weighted toward `label`, strongest first.
    pub top_tokens: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub paths: ArtifactPaths,
    pub default_model_version: String,
    pub fake_threshold: f64,
}

impl ScorerConfig {
    pub fn from_dir(dir: &Path, default_model_version: &str, fake_threshold: f64) -> Self {
        Self {
            paths: ArtifactPaths::in_dir(dir),
            default_model_version: default_model_version.to_string(),
            fake_threshold,
        }
    }
}

#[derive(Debug)]
pub enum ScorerState {
    Loaded(Arc<ModelArtifactBundle>),
    Unloaded(LoadFailure),
}

#[derive(Debug)]
pub struct Scorer {
    state: ScorerState,
    fake_threshold: f64,
}

impl Scorer {
    /// Attempt to load the artifact bundle. Always returns a Scorer; check
    /// `loaded()` or `load_failure()` for the outcome.
    pub fn load(config: &ScorerConfig) -> Self {
        let state = match load_bundle(&config.paths, &config.default_model_version) {
            Ok(bundle) => {
                info!(
                    model_version = %bundle.model_version,
                    features = bundle.vectorizer.dim(),
                    ruleset = %bundle.normalizer.profile().ruleset,
                    "Model artifacts loaded"
                );
                ScorerState::Loaded(Arc::new(bundle))
            }
            Err(failure) => {
                warn!(error = %failure, "Model artifacts not loaded, predictions unavailable");
                ScorerState::Unloaded(failure)
            }
        };
        Self {
            state,
            fake_threshold: config.fake_threshold,
        }
    }

    /// A Loaded scorer over an in-memory bundle.
    pub fn from_bundle(bundle: ModelArtifactBundle, fake_threshold: f64) -> Self {
        Self {
            state: ScorerState::Loaded(Arc::new(bundle)),
            fake_threshold,
        }
    }

    pub fn state(&self) -> &ScorerState {
        &self.state
    }

    pub fn loaded(&self) -> bool {
        matches!(self.state, ScorerState::Loaded(_))
    }

    pub fn bundle(&self) -> Option<&Arc<ModelArtifactBundle>> {
        match &self.state {
            ScorerState::Loaded(bundle) => Some(bundle),
            ScorerState::Unloaded(_) => None,
        }
    }

    pub fn model_version(&self) -> Option<&str> {
        self.bundle().map(|b| b.model_version.as_str())
    }

    pub fn load_failure(&self) -> Option<&LoadFailure> {
        match &self.state {
            ScorerState::Unloaded(failure) => Some(failure),
            ScorerState::Loaded(_) => None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.fake_threshold
    }

    /// The normalizer built from the loaded model's profile.
    pub fn normalizer(&self) -> Option<&Normalizer> {
        self.bundle().map(|b| &b.normalizer)
    }

    /// The normalizer profile the loaded model was trained with, or the
    /// default profile when no model is loaded.
    pub fn normalizer_profile(&self) -> NormalizerProfile {
        self.bundle()
            .map(|b| b.normalizer.profile().clone())
            .unwrap_or_default()
    }

    /// Score one normalized document.
    pub fn predict(&self, normalized: &str) -> Result<PredictionResult, PredictError> {
        let bundle = self.bundle().ok_or(PredictError::ModelNotLoaded)?;

        let x = bundle.vectorizer.transform(normalized);
        if let Some((i, _)) = x.entries.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PredictError::InferenceFailed(format!(
                "non-finite feature value at index {i}"
            )));
        }

        let classifier = bundle.classifier.as_ref();
        let (label, probability) = match classifier.predict_proba(&x) {
            Some(proba) => {
                let p_fake = class_probability(&proba, bundle.class_index(Label::Fake))?;
                let p_real = class_probability(&proba, bundle.class_index(Label::Real))?;
                decide(p_fake, p_real, self.fake_threshold)
            }
            None => {
                let idx = classifier.predict(&x);
                let label = bundle.label_at(idx).ok_or_else(|| {
                    PredictError::InferenceFailed(format!("classifier predicted unknown class {idx}"))
                })?;
                (label, 1.0)
            }
        };

        let top_tokens = match attribute(bundle, label) {
            Ok(tokens) => Some(tokens),
            Err(reason) => {
                debug!(%reason, "Top-token attribution unavailable");
                None
            }
        };

        debug!(
            %label,
            probability,
            features = x.nnz(),
            "Prediction complete"
        );

        Ok(PredictionResult {
            label,
            probability,
            top_tokens,
        })
    }
}

fn class_probability(proba: &[f64], idx: usize) -> Result<f64, PredictError> {
    let p = proba.get(idx).copied().ok_or_else(|| {
        PredictError::InferenceFailed(format!(
            "probability vector has {} entries, class index {idx}",
            proba.len()
        ))
    })?;
    if !p.is_finite() {
        return Err(PredictError::InferenceFailed(format!(
            "non-finite probability for class index {idx}"
        )));
    }
    Ok(p)
}

fn attribute(bundle: &ModelArtifactBundle, label: Label) -> Result<Vec<String>, AttributionUnavailable> {
    top_tokens(
        bundle.classifier.as_ref(),
        &bundle.vectorizer,
        bundle.class_index(label),
        TOP_K,
    )
}

/// Asymmetric decision rule: FAKE only when `p_fake` reaches the threshold.
/// Returns the chosen label and its own probability, clamped to [0, 1].
pub fn decide(p_fake: f64, p_real: f64, threshold: f64) -> (Label, f64) {
    if p_fake >= threshold {
        (Label::Fake, p_fake.clamp(0.0, 1.0))
    } else {
        (Label::Real, p_real.clamp(0.0, 1.0))
    }
}
