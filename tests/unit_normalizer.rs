// Unit tests for the text normalizer.
//
// Covers the output alphabet, idempotence, the documented example inputs, and
// stopword/lemmatizer interaction across profiles.

use veracity::text::{default_normalizer, normalize, Normalizer, NormalizerProfile, StopwordList};

fn assert_canonical(out: &str) {
    assert!(
        out.chars().all(|c| c.is_ascii_lowercase() || c == ' '),
        "unexpected character in {out:?}"
    );
    assert!(!out.starts_with(' ') && !out.ends_with(' '), "untrimmed: {out:?}");
    assert!(!out.contains("  "), "double space in {out:?}");
}

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "!!!???",
    "1234 5678",
    "Hello <b>World</b>! Visit http://example.com or contact me@domain.com\nNew line.",
    "This is a test: 1234, symbols! @#$%",
    "BREAKING: Scientists SHOCKED by what they found in the Senate's reports...",
    "The children went running to the meetings; officials denied the stories.",
    "Emoji 🎉 and accents: café, naïve, Zürich — mixed\tscripts 日本語",
    "www.fake-news.example/article?id=7 <script>alert('x')</script>",
    "It's the governments' policies, isn't it? Analyses of crises vary.",
    "a b c d e f g",
];

// ============================================================
// Output alphabet and idempotence
// ============================================================

#[test]
fn output_is_lowercase_letters_and_single_spaces() {
    for s in SAMPLES {
        assert_canonical(&normalize(s));
    }
}

#[test]
fn normalize_is_a_fixed_point_of_itself() {
    for s in SAMPLES {
        let once = normalize(s);
        let twice = normalize(&once);
        assert_eq!(once, twice, "not idempotent for {s:?}");
    }
}

#[test]
fn normalize_is_deterministic() {
    for s in SAMPLES {
        assert_eq!(normalize(s), normalize(s));
    }
}

#[test]
fn pathological_input_degrades_to_empty() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   \n\t "), "");
    assert_eq!(normalize("!!! 123 ???"), "");
    assert_eq!(normalize("the and of"), "");
}

// ============================================================
// Documented examples
// ============================================================

#[test]
fn noise_is_removed_and_words_survive() {
    let out = normalize(
        "Hello <b>World</b>! Visit http://example.com or contact me@domain.com\nNew line.",
    );
    assert!(!out.contains("http"));
    assert!(!out.contains('@'));
    assert!(!out.contains("<b>"));
    let tokens: Vec<&str> = out.split(' ').collect();
    for word in ["hello", "world", "visit", "new", "line"] {
        assert!(tokens.contains(&word), "{word} missing from {out:?}");
    }
    assert!(!out.contains("example"));
    assert!(!out.contains("domain"));
}

#[test]
fn digits_and_symbols_are_removed() {
    let out = normalize("This is a test: 1234, symbols! @#$%");
    assert!(!out.chars().any(|c| c.is_ascii_digit()));
    assert!(!out.chars().any(|c| c.is_ascii_punctuation()));
    let tokens: Vec<&str> = out.split(' ').collect();
    assert!(tokens.contains(&"test"));
    assert!(tokens.iter().any(|t| t.starts_with("symbol")));
    assert_eq!(out, "test symbol");
}

#[test]
fn lemmatizes_inflected_forms() {
    assert_eq!(
        normalize("The children went running to the meetings"),
        "child go run meet"
    );
    assert_eq!(normalize("Officials denied the stories"), "official deny story");
}

#[test]
fn possessive_and_contraction_fragments_dropped() {
    // "senate's" -> "senate s"; "isn't" -> "isn t": the fragments are stopwords.
    assert_eq!(normalize("The Senate's claims, isn't it"), "senate claim");
}

// ============================================================
// Profiles
// ============================================================

#[test]
fn default_normalizer_matches_free_function() {
    let normalizer = default_normalizer().unwrap();
    assert_eq!(normalizer.profile(), &NormalizerProfile::default());
    for s in SAMPLES {
        assert_eq!(normalizer.normalize(s), normalize(s));
    }
}

#[test]
fn iso_profile_is_also_idempotent() {
    let normalizer = Normalizer::new(NormalizerProfile {
        stopwords: StopwordList::Iso,
        ..NormalizerProfile::default()
    })
    .unwrap();
    for s in SAMPLES {
        let once = normalizer.normalize(s);
        assert_canonical(&once);
        assert_eq!(normalizer.normalize(&once), once, "not idempotent for {s:?}");
    }
}

#[test]
fn profile_round_trips_through_metadata_json() {
    let json = r#"{"ruleset": "veracity-lemma-1", "stopwords": "iso"}"#;
    let profile: NormalizerProfile = serde_json::from_str(json).unwrap();
    assert_eq!(profile.stopwords, StopwordList::Iso);
    assert!(Normalizer::new(profile).is_ok());
}
