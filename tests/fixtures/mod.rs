// Shared fixtures: a tiny but complete model artifact directory.
//
// Vocabulary terms are already in normalized (lemmatized) form. The single
// coefficient row scores REAL, so FAKE-leaning terms carry negative weights.

#![allow(dead_code)]

use std::path::Path;

use serde_json::json;
use veracity::model::artifacts::{sha256_hex, CLASSIFIER_FILE, METADATA_FILE, VECTORIZER_FILE};

pub const TERMS: [&str; 6] = ["hoax", "shock", "secret", "senate", "report", "official"];
pub const REAL_WEIGHTS: [f64; 6] = [-2.0, -1.5, -1.0, 1.5, 1.0, 2.0];

pub fn vectorizer_json() -> String {
    let vocabulary: serde_json::Map<String, serde_json::Value> = TERMS
        .iter()
        .enumerate()
        .map(|(i, t)| (t.to_string(), json!(i)))
        .collect();
    json!({
        "vocabulary": vocabulary,
        "idf": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        "ngram_range": [1, 1],
        "sublinear_tf": false,
        "norm": "l2"
    })
    .to_string()
}

pub fn classifier_json() -> String {
    json!({
        "kind": "logistic_regression",
        "classes": ["FAKE", "REAL"],
        "coef": [REAL_WEIGHTS],
        "intercept": [0.0]
    })
    .to_string()
}

/// A class-prior model: every document gets exactly these probabilities.
pub fn prior_classifier_json(p_fake: f64) -> String {
    json!({
        "kind": "prior",
        "classes": ["FAKE", "REAL"],
        "class_prior": [p_fake, 1.0 - p_fake]
    })
    .to_string()
}

/// Write vectorizer, classifier and metadata (with matching checksums).
pub fn write_model(dir: &Path, classifier: &str) {
    let vectorizer = vectorizer_json();
    std::fs::write(dir.join(VECTORIZER_FILE), &vectorizer).unwrap();
    std::fs::write(dir.join(CLASSIFIER_FILE), classifier).unwrap();
    let metadata = json!({
        "model_version": "fixture_v1",
        "trained_on": "fixture.csv",
        "trained_at": "2026-01-01T00:00:00Z",
        "normalizer": { "ruleset": "veracity-lemma-1", "stopwords": "nltk" },
        "checksums": {
            "vectorizer": sha256_hex(vectorizer.as_bytes()),
            "classifier": sha256_hex(classifier.as_bytes())
        }
    });
    std::fs::write(dir.join(METADATA_FILE), metadata.to_string()).unwrap();
}

/// Vectorizer and classifier only, no metadata file.
pub fn write_model_without_metadata(dir: &Path) {
    std::fs::write(dir.join(VECTORIZER_FILE), vectorizer_json()).unwrap();
    std::fs::write(dir.join(CLASSIFIER_FILE), classifier_json()).unwrap();
}
