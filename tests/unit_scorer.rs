// Unit tests for the Scorer: loading, the asymmetric threshold, and
// top-token attribution.
//
// Every test writes its own artifact directory under a tempdir.

mod fixtures;

use veracity::model::{Label, LoadFailure, PredictError, Scorer, ScorerConfig};
use veracity::text::StopwordList;

fn load(dir: &std::path::Path, threshold: f64) -> Scorer {
    Scorer::load(&ScorerConfig::from_dir(dir, "default_v0", threshold))
}

fn prior_scorer(p_fake: f64, threshold: f64) -> (tempfile::TempDir, Scorer) {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::prior_classifier_json(p_fake));
    let scorer = load(dir.path(), threshold);
    assert!(scorer.loaded(), "{:?}", scorer.load_failure());
    (dir, scorer)
}

// ============================================================
// Loading
// ============================================================

#[test]
fn loads_complete_artifact_directory() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded());
    assert_eq!(scorer.model_version(), Some("fixture_v1"));
    assert!(scorer.load_failure().is_none());
    assert_eq!(scorer.threshold(), 0.6);
}

#[test]
fn missing_metadata_uses_default_version() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded());
    assert_eq!(scorer.model_version(), Some("default_v0"));
}

#[test]
fn unreadable_metadata_uses_default_version() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    std::fs::write(dir.path().join("metadata.json"), "{ not json").unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded());
    assert_eq!(scorer.model_version(), Some("default_v0"));
}

#[test]
fn missing_artifacts_leave_scorer_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert_eq!(scorer.model_version(), None);
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::MissingArtifact(_))
    ));
    assert!(matches!(
        scorer.predict("hoax"),
        Err(PredictError::ModelNotLoaded)
    ));
}

#[test]
fn corrupt_classifier_leaves_scorer_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    std::fs::write(dir.path().join("classifier.json"), "[1, 2, 3]").unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::Malformed { .. })
    ));
}

#[test]
fn checksum_mismatch_leaves_scorer_unloaded() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    // Tamper after the checksums were recorded.
    std::fs::write(
        dir.path().join("classifier.json"),
        fixtures::prior_classifier_json(0.5),
    )
    .unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::ChecksumMismatch { path, .. }) if path.ends_with("classifier.json")
    ));
}

fn write_metadata(dir: &std::path::Path, metadata: serde_json::Value) {
    std::fs::write(dir.join("metadata.json"), metadata.to_string()).unwrap();
}

#[test]
fn unknown_stopword_list_in_metadata_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(
        dir.path(),
        serde_json::json!({
            "model_version": "trained_v7",
            "normalizer": { "ruleset": "veracity-lemma-1", "stopwords": "spacy" },
            "checksums": { "vectorizer": "00", "classifier": "00" }
        }),
    );
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::Malformed { path, reason })
            if path.ends_with("metadata.json") && reason.starts_with("normalizer")
    ));
}

#[test]
fn declared_checksums_verified_despite_descriptive_noise() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(
        dir.path(),
        serde_json::json!({
            "model_version": "trained_v7",
            "trained_on": 123,
            "checksums": { "vectorizer": "00" }
        }),
    );
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::ChecksumMismatch { path, .. }) if path.ends_with("vectorizer.json")
    ));
}

#[test]
fn wrong_typed_checksum_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(
        dir.path(),
        serde_json::json!({ "checksums": { "vectorizer": 42 } }),
    );
    let scorer = load(dir.path(), 0.6);

    assert!(!scorer.loaded());
    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::Malformed { reason, .. }) if reason.starts_with("checksums")
    ));
}

#[test]
fn mistyped_descriptive_fields_keep_declared_version() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(
        dir.path(),
        serde_json::json!({
            "model_version": "trained_v7",
            "trained_on": ["a.csv", "b.csv"],
            "trained_at": 20260101,
            "val_metrics": { "accuracy": 0.97 }
        }),
    );
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded(), "{:?}", scorer.load_failure());
    assert_eq!(scorer.model_version(), Some("trained_v7"));
    let metadata = &scorer.bundle().unwrap().metadata;
    assert_eq!(metadata.trained_on, None);
    assert_eq!(metadata.extra["val_metrics"]["accuracy"], 0.97);
}

#[test]
fn declared_stopword_list_is_served() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(
        dir.path(),
        serde_json::json!({ "normalizer": { "stopwords": "iso" } }),
    );
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded());
    assert_eq!(scorer.normalizer_profile().stopwords, StopwordList::Iso);
    assert_eq!(scorer.normalizer().unwrap().profile().stopwords, StopwordList::Iso);
}

#[test]
fn non_object_metadata_uses_default_version() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    write_metadata(dir.path(), serde_json::json!([1, 2, 3]));
    let scorer = load(dir.path(), 0.6);

    assert!(scorer.loaded());
    assert_eq!(scorer.model_version(), Some("default_v0"));
}

#[test]
fn wrong_class_labels_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    let classifier = serde_json::json!({
        "kind": "logistic_regression",
        "classes": ["SATIRE", "REAL"],
        "coef": [fixtures::REAL_WEIGHTS],
        "intercept": [0.0]
    });
    std::fs::write(dir.path().join("classifier.json"), classifier.to_string()).unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(matches!(scorer.load_failure(), Some(LoadFailure::Invalid(_))));
}

#[test]
fn coefficient_width_must_match_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    let classifier = serde_json::json!({
        "kind": "logistic_regression",
        "classes": ["FAKE", "REAL"],
        "coef": [[1.0, 2.0]],
        "intercept": [0.0]
    });
    std::fs::write(dir.path().join("classifier.json"), classifier.to_string()).unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(matches!(scorer.load_failure(), Some(LoadFailure::Invalid(_))));
}

#[test]
fn unknown_normalizer_ruleset_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    let metadata = serde_json::json!({
        "model_version": "future",
        "normalizer": { "ruleset": "veracity-lemma-99", "stopwords": "nltk" }
    });
    std::fs::write(dir.path().join("metadata.json"), metadata.to_string()).unwrap();
    let scorer = load(dir.path(), 0.6);

    assert!(matches!(
        scorer.load_failure(),
        Some(LoadFailure::Normalizer(_))
    ));
}

// ============================================================
// Asymmetric threshold
// ============================================================

#[test]
fn below_threshold_reports_real_with_real_probability() {
    let (_dir, scorer) = prior_scorer(0.59, 0.6);
    let result = scorer.predict("anything at all").unwrap();
    assert_eq!(result.label, Label::Real);
    assert!((result.probability - 0.41).abs() < 1e-9);
}

#[test]
fn above_threshold_reports_fake() {
    let (_dir, scorer) = prior_scorer(0.61, 0.6);
    let result = scorer.predict("anything at all").unwrap();
    assert_eq!(result.label, Label::Fake);
    assert!((result.probability - 0.61).abs() < 1e-9);
}

#[test]
fn exactly_at_threshold_is_fake() {
    let (_dir, scorer) = prior_scorer(0.6, 0.6);
    let result = scorer.predict("anything at all").unwrap();
    assert_eq!(result.label, Label::Fake);
    assert!((result.probability - 0.6).abs() < 1e-9);
}

#[test]
fn threshold_is_per_scorer() {
    let (_dir_a, strict) = prior_scorer(0.7, 0.8);
    let (_dir_b, lenient) = prior_scorer(0.7, 0.5);
    assert_eq!(strict.predict("x").unwrap().label, Label::Real);
    assert_eq!(lenient.predict("x").unwrap().label, Label::Fake);
}

#[test]
fn prior_model_has_no_attribution() {
    let (_dir, scorer) = prior_scorer(0.61, 0.6);
    assert_eq!(scorer.predict("hoax").unwrap().top_tokens, None);
}

// ============================================================
// Linear model predictions and attribution
// ============================================================

#[test]
fn fake_leaning_terms_predict_fake() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = load(dir.path(), 0.6);

    let result = scorer.predict("hoax shock secret").unwrap();
    assert_eq!(result.label, Label::Fake);
    assert!(result.probability > 0.9 && result.probability <= 1.0);
    assert_eq!(
        result.top_tokens.unwrap(),
        vec!["hoax", "shock", "secret", "report", "senate", "official"]
    );
}

#[test]
fn real_leaning_terms_predict_real() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = load(dir.path(), 0.6);

    let result = scorer.predict("senate official report").unwrap();
    assert_eq!(result.label, Label::Real);
    assert!(result.probability > 0.9);
    assert_eq!(
        result.top_tokens.unwrap(),
        vec!["official", "senate", "report", "secret", "shock", "hoax"]
    );
}

#[test]
fn top_tokens_are_bounded_unique_and_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = load(dir.path(), 0.6);

    for text in ["hoax", "official", "", "senate hoax"] {
        let result = scorer.predict(text).unwrap();
        let tokens = result.top_tokens.expect("linear model exposes coefficients");
        assert!(tokens.len() <= 6);

        let mut unique = tokens.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), tokens.len());

        // Weights toward the predicted label, in descending order.
        let sign = match result.label {
            Label::Real => 1.0,
            Label::Fake => -1.0,
        };
        let weights: Vec<f64> = tokens
            .iter()
            .map(|t| {
                let i = fixtures::TERMS.iter().position(|term| term == t).unwrap();
                sign * fixtures::REAL_WEIGHTS[i]
            })
            .collect();
        assert!(weights.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn out_of_vocabulary_text_still_predicts() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = load(dir.path(), 0.6);

    // All-zero vector: z = 0, p_fake = 0.5 < 0.6.
    let result = scorer.predict("completely unrelated words").unwrap();
    assert_eq!(result.label, Label::Real);
    assert!((result.probability - 0.5).abs() < 1e-12);
}

#[test]
fn linear_svc_falls_back_to_raw_prediction() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model_without_metadata(dir.path());
    let classifier = serde_json::json!({
        "kind": "linear_svc",
        "classes": ["FAKE", "REAL"],
        "coef": [fixtures::REAL_WEIGHTS],
        "intercept": [0.0]
    });
    std::fs::write(dir.path().join("classifier.json"), classifier.to_string()).unwrap();
    let scorer = load(dir.path(), 0.6);

    let result = scorer.predict("hoax").unwrap();
    assert_eq!(result.label, Label::Fake);
    assert_eq!(result.probability, 1.0);
    assert_eq!(result.top_tokens.unwrap()[0], "hoax");
}

#[test]
fn scorer_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_model(dir.path(), &fixtures::classifier_json());
    let scorer = std::sync::Arc::new(load(dir.path(), 0.6));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scorer = std::sync::Arc::clone(&scorer);
            std::thread::spawn(move || scorer.predict("hoax secret").unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
