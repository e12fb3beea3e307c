// Text normalizer: raw document text to the canonical token string.
//
// The same function prepares training corpora and live requests, so every
// stage here is deterministic: no randomness, no locale, no clock. Stages run
// strictly in order:
//
//   clean_text -> strip_non_alpha -> tokenize -> remove_stopwords
//     -> lemmatize -> join_tokens

use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::lemma::{self, RULESET_VERSION};
use super::stopwords::{StopwordList, StopwordSet};

/// Everything that determines the normalizer's output. Recorded in model
/// metadata so serving uses the same settings the vectorizer was fit with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizerProfile {
    /// Lemmatizer ruleset identifier (see `lemma::RULESET_VERSION`).
    #[serde(default = "default_ruleset")]
    pub ruleset: String,
    #[serde(default)]
    pub stopwords: StopwordList,
}

fn default_ruleset() -> String {
    RULESET_VERSION.to_string()
}

impl Default for NormalizerProfile {
    fn default() -> Self {
        Self {
            ruleset: default_ruleset(),
            stopwords: StopwordList::default(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum NormalizerError {
    #[error("unsupported lemmatizer ruleset {found:?} (this build implements {expected:?})")]
    UnsupportedRuleset { expected: String, found: String },

    #[error("stopword list {0} is empty")]
    EmptyStopwords(StopwordList),

    #[error("invalid noise pattern {pattern}: {reason}")]
    Pattern { pattern: &'static str, reason: String },
}

/// One character that is not Unicode whitespace (regex-lite's `\S` is
/// ASCII-only).
macro_rules! non_space {
    () => {
        "[^\t\n\x0b\x0c\r \x1c-\x1f\u{85}\u{a0}\u{1680}\u{2000}-\u{200a}\u{2028}\u{2029}\u{202f}\u{205f}\u{3000}]"
    };
}

/// Substrings removed in the first stage, in the order they are applied.
const NOISE_PATTERNS: [&str; 4] = [
    concat!("http", non_space!(), "+"),                       // URLs
    concat!(r"www\.", non_space!(), "+"),                     // bare www. links
    concat!(non_space!(), "+@", non_space!(), "+"),           // email addresses
    r"<[^>]+>",                                               // HTML tags
];

/// The initialized normalizer. Construct once and share; `normalize` takes
/// `&self` and never fails.
#[derive(Debug)]
pub struct Normalizer {
    profile: NormalizerProfile,
    stopwords: StopwordSet,
    noise: Vec<Regex>,
}

impl Normalizer {
    /// Build a normalizer for the given profile. This is the one place
    /// linguistic resources are loaded, and the one place that can fail.
    pub fn new(profile: NormalizerProfile) -> Result<Self, NormalizerError> {
        if profile.ruleset != RULESET_VERSION {
            return Err(NormalizerError::UnsupportedRuleset {
                expected: RULESET_VERSION.to_string(),
                found: profile.ruleset.clone(),
            });
        }

        let stopwords = StopwordSet::load(profile.stopwords);
        if stopwords.is_empty() {
            return Err(NormalizerError::EmptyStopwords(profile.stopwords));
        }

        let noise = NOISE_PATTERNS
            .iter()
            .map(|&pattern| {
                Regex::new(pattern).map_err(|e| NormalizerError::Pattern {
                    pattern,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            ruleset = %profile.ruleset,
            stopwords = %profile.stopwords,
            stopword_count = stopwords.len(),
            "Initialized normalizer"
        );

        Ok(Self {
            profile,
            stopwords,
            noise,
        })
    }

    pub fn profile(&self) -> &NormalizerProfile {
        &self.profile
    }

    /// Full pipeline: raw text in, canonical space-separated token string out.
    pub fn normalize(&self, text: &str) -> String {
        let cleaned = self.clean_text(text);
        let alpha = strip_non_alpha(&cleaned);
        let tokens = tokenize(&alpha);
        let tokens = self.remove_stopwords(tokens);
        let tokens = lemma::lemmatize(tokens, &self.stopwords);
        join_tokens(&tokens)
    }

    /// Stage 1: lowercase, drop URLs, emails and HTML tags, flatten line
    /// breaks and tabs, collapse whitespace.
    pub fn clean_text(&self, text: &str) -> String {
        let mut text = text.to_lowercase();
        for re in &self.noise {
            text = re.replace_all(&text, " ").into_owned();
        }
        collapse_whitespace(&text)
    }

    /// Stage 4: drop tokens in the configured stopword list.
    pub fn remove_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .collect()
    }

    /// Stage 5: map tokens to their lemma under the fixed rule set.
    pub fn lemmatize(&self, tokens: Vec<String>) -> Vec<String> {
        lemma::lemmatize(tokens, &self.stopwords)
    }
}

/// Stage 2: every character that is not an ASCII letter becomes a space,
/// then whitespace is collapsed again.
pub fn strip_non_alpha(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c } else { ' ' })
        .collect();
    collapse_whitespace(&replaced)
}

/// Stage 3: maximal runs of ASCII letters. Anything else only separates.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stage 6.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The process-wide default normalizer (default profile), initialized on
/// first use.
pub fn default_normalizer() -> Result<&'static Normalizer, NormalizerError> {
    static DEFAULT: OnceLock<Result<Normalizer, NormalizerError>> = OnceLock::new();
    DEFAULT
        .get_or_init(|| Normalizer::new(NormalizerProfile::default()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Normalize with the default profile. Total: if the default normalizer could
/// not be initialized the result is an empty string.
pub fn normalize(text: &str) -> String {
    match default_normalizer() {
        Ok(normalizer) => normalizer.normalize(text),
        Err(e) => {
            error!(error = %e, "Default normalizer unavailable");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(NormalizerProfile::default()).unwrap()
    }

    #[test]
    fn test_clean_text_removes_urls_emails_and_html() {
        let raw = "Hello <b>World</b>! Visit http://example.com or contact me@domain.com\nNew line.";
        let cleaned = normalizer().clean_text(raw);
        assert!(!cleaned.contains("http"));
        assert!(!cleaned.contains('@'));
        assert!(!cleaned.contains("<b>"));
        assert!(cleaned.contains("new line"));
        assert_eq!(cleaned, cleaned.trim());
    }

    #[test]
    fn test_clean_text_removes_www_links() {
        let cleaned = normalizer().clean_text("see www.example.org/page today");
        assert_eq!(cleaned, "see today");
    }

    #[test]
    fn test_links_and_emails_stop_at_unicode_whitespace() {
        let n = normalizer();
        let cleaned = n.clean_text("visit http://x.com\u{a0}today and mail me@x.org\u{2003}tomorrow");
        assert!(cleaned.contains("today"));
        assert!(cleaned.contains("tomorrow"));
        assert!(!cleaned.contains("x.com"));
        assert!(!cleaned.contains('@'));
        assert_eq!(
            n.normalize("see www.x.org\u{3000}now or ask bob\u{2009}jo@x.org"),
            "see ask bob"
        );
    }

    #[test]
    fn test_strip_non_alpha_keeps_letters_only() {
        let out = strip_non_alpha("this is a test: 1234, symbols! @#$%");
        assert_eq!(out, "this is a test symbols");
    }

    #[test]
    fn test_tokenize_returns_only_words() {
        let tokens = tokenize("hello, world! it's 2025.");
        assert_eq!(tokens, vec!["hello", "world", "it", "s"]);
    }

    #[test]
    fn test_stopwords_removed() {
        let tokens = ["this", "is", "a", "sample", "text"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let filtered = normalizer().remove_stopwords(tokens);
        assert_eq!(filtered, vec!["sample", "text"]);
    }

    #[test]
    fn test_possessive_artifacts_dropped() {
        assert_eq!(normalizer().normalize("The senator's claims"), "senator claim");
    }

    #[test]
    fn test_empty_and_pathological_input() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \n\t "), "");
        assert_eq!(n.normalize("1234 !!! <br/> the a an"), "");
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        // "ve" is itself an NLTK stopword
        assert_eq!(normalizer().normalize("Café naïve"), "caf na");
    }

    #[test]
    fn test_unsupported_ruleset_rejected() {
        let profile = NormalizerProfile {
            ruleset: "wordnet-3.0".to_string(),
            stopwords: StopwordList::Nltk,
        };
        let err = Normalizer::new(profile).unwrap_err();
        assert!(matches!(err, NormalizerError::UnsupportedRuleset { .. }));
    }

    #[test]
    fn test_free_function_matches_default_normalizer() {
        let text = "Breaking: Officials DENIED the reports!";
        assert_eq!(normalize(text), normalizer().normalize(text));
    }
}
