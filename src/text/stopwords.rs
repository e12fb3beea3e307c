// Stopword lists for the normalizer.
//
// The list in use is part of the normalizer profile and must be the same one
// the vectorizer was fit with. The NLTK English list is embedded so it never
// depends on anything outside the binary; the ISO list comes from the
// `stop-words` crate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

/// NLTK English stopwords (179 entries). Entries with apostrophes never match
/// a token after normalization but are kept so the list stays recognizable.
const NLTK_ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

/// Which fixed stopword list the normalizer removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopwordList {
    /// NLTK English list, the list the baseline models are trained with.
    #[default]
    Nltk,
    /// stopwords-iso English list from the `stop-words` crate.
    Iso,
}

impl StopwordList {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopwordList::Nltk => "nltk",
            StopwordList::Iso => "iso",
        }
    }
}

impl std::fmt::Display for StopwordList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A materialized stopword set. Only lowercase ASCII words are kept because
/// nothing else can survive the alphabetic filter.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    pub fn load(list: StopwordList) -> Self {
        let words = match list {
            StopwordList::Nltk => NLTK_ENGLISH
                .iter()
                .filter(|w| is_token_shaped(w))
                .map(|w| w.to_string())
                .collect(),
            StopwordList::Iso => {
                let words: Vec<String> = get(LANGUAGE::English);
                words
                    .into_iter()
                    .map(|w| w.to_lowercase())
                    .filter(|w| is_token_shaped(w))
                    .collect()
            }
        };
        Self { words }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn is_token_shaped(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase())
}
