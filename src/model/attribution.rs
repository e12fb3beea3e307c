// Top-token attribution.
//
// Explains a prediction with the vocabulary terms whose learned weights push
// hardest toward the predicted class. This is a property of the model, not of
// the document: every prediction of the same class gets the same list.

use std::cmp::Ordering;

use super::classifier::Classifier;
use super::error::AttributionUnavailable;
use super::vectorizer::TfidfVectorizer;

/// Number of tokens reported per prediction.
pub const TOP_K: usize = 6;

/// The `k` highest-weighted terms for `class_idx`, strongest first.
///
/// Equal weights keep ascending feature-index order, so the result is stable
/// across runs.
pub fn top_tokens(
    classifier: &dyn Classifier,
    vectorizer: &TfidfVectorizer,
    class_idx: usize,
    k: usize,
) -> Result<Vec<String>, AttributionUnavailable> {
    let weights = classifier
        .class_coefficients(class_idx)
        .ok_or(AttributionUnavailable::NoCoefficients)?;
    let names = vectorizer
        .feature_names()
        .ok_or(AttributionUnavailable::NoFeatureNames)?;

    if weights.len() != names.len() {
        return Err(AttributionUnavailable::WidthMismatch {
            coefficients: weights.len(),
            features: names.len(),
        });
    }
    if let Some(i) = weights.iter().position(|w| !w.is_finite()) {
        return Err(AttributionUnavailable::NonFiniteWeight(i));
    }

    let mut order: Vec<usize> = (0..weights.len()).collect();
    // Stable: equal weights stay in index order. `partial_cmp` treats -0.0
    // and 0.0 as equal; all weights are finite here.
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
    });

    Ok(order
        .into_iter()
        .take(k)
        .map(|i| names[i].clone())
        .collect())
}
