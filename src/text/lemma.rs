// Rule-based lemmatizer.
//
// A small, fixed rule set: an irregular-form table followed by suffix
// detachment for plural nouns and regular verb inflections. The rules are
// versioned by RULESET_VERSION and recorded in model metadata, because the
// vectorizer vocabulary only makes sense for the exact rules it was fit with.
//
// Rules are applied repeatedly until the word stops changing, so every lemma
// this module returns maps to itself. That property is what makes the whole
// normalizer a fixed point of itself.

use std::collections::HashMap;
use std::sync::OnceLock;

use super::stopwords::StopwordSet;

/// Identifier of the rule set below. Bump it whenever any rule or table entry
/// changes; models trained with another ruleset will refuse to load.
pub const RULESET_VERSION: &str = "veracity-lemma-1";

/// Upper bound on rule passes per token.
const MAX_PASSES: usize = 6;

/// Words the suffix rules would mangle. They are their own lemma.
const INVARIANT: &[&str] = &[
    "news", "series", "species", "politics", "economics", "physics", "mathematics", "ethics",
    "statistics", "always", "perhaps", "whereas", "christmas", "texas", "kansas", "arkansas",
    "morning", "evening", "nothing", "something", "anything", "everything", "hundred",
];

const IRREGULAR: &[(&str, &str)] = &[
    // nouns
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("wolves", "wolf"),
    ("halves", "half"),
    ("thieves", "thief"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    // verbs
    ("went", "go"),
    ("gone", "go"),
    ("ran", "run"),
    ("said", "say"),
    ("says", "say"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("came", "come"),
    ("saw", "see"),
    ("seen", "see"),
    ("told", "tell"),
    ("thought", "think"),
    ("brought", "bring"),
    ("bought", "buy"),
    ("found", "find"),
    ("felt", "feel"),
    ("kept", "keep"),
    ("held", "hold"),
    ("paid", "pay"),
    ("sold", "sell"),
    ("lost", "lose"),
    ("met", "meet"),
    ("led", "lead"),
    ("fell", "fall"),
    ("wrote", "write"),
    ("written", "write"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("chose", "choose"),
    ("began", "begin"),
    ("begun", "begin"),
    ("knew", "know"),
    ("known", "know"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("ate", "eat"),
    ("eaten", "eat"),
    ("fought", "fight"),
    ("caught", "catch"),
    ("taught", "teach"),
    ("sent", "send"),
    ("spent", "spend"),
    ("built", "build"),
    ("became", "become"),
    ("got", "get"),
    ("gotten", "get"),
];

fn irregular() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| IRREGULAR.iter().copied().collect())
}

/// Lemmatize a token list. A lemma replaces its token only when it is not a
/// stopword; otherwise the token is kept as-is so a second normalization pass
/// cannot drop it.
pub fn lemmatize(tokens: Vec<String>, stopwords: &StopwordSet) -> Vec<String> {
    tokens
        .into_iter()
        .map(|token| match lemma_of(&token) {
            Some(lemma) if !stopwords.contains(&lemma) => lemma,
            _ => token,
        })
        .collect()
}

/// The base form of a single lowercase token, or `None` if the rules do not
/// settle within MAX_PASSES. The rules are byte-oriented, so a token with any
/// non-ASCII character is its own lemma.
pub fn lemma_of(word: &str) -> Option<String> {
    if !word.is_ascii() {
        return Some(word.to_string());
    }
    let mut current = word.to_string();
    for _ in 0..MAX_PASSES {
        match apply_rules(&current) {
            Some(next) if next != current => current = next,
            _ => return Some(current),
        }
    }
    None
}

/// One pass of the rule set. Returns `None` when no rule applies.
fn apply_rules(word: &str) -> Option<String> {
    if INVARIANT.contains(&word) {
        return None;
    }
    if let Some(lemma) = irregular().get(word) {
        return Some(lemma.to_string());
    }

    let len = word.len();

    if word.ends_with("ies") && len > 4 {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if word.ends_with("sses") {
        return Some(word[..len - 2].to_string());
    }
    if (word.ends_with("ches") || word.ends_with("shes") || word.ends_with("xes") || word.ends_with("zzes"))
        && len > 4
    {
        return Some(word[..len - 2].to_string());
    }
    if word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
        && len > 3
    {
        return Some(word[..len - 1].to_string());
    }
    if let Some(stem) = word.strip_suffix("ing") {
        if stem.len() >= 3 && has_vowel(stem) {
            return Some(restore_stem(stem));
        }
        return None;
    }
    if word.ends_with("ied") && len > 4 {
        return Some(format!("{}y", &word[..len - 3]));
    }
    if let Some(stem) = word.strip_suffix("ed") {
        if !stem.ends_with('e') && stem.len() >= 3 && has_vowel(stem) {
            return Some(restore_stem(stem));
        }
    }
    None
}

/// Repair a stem after removing `-ing` / `-ed`: undouble a final consonant
/// ("runn" -> "run") or restore a silent e on short CVC stems ("mak" -> "make").
fn restore_stem(stem: &str) -> String {
    let bytes = stem.as_bytes();
    let n = bytes.len();

    if ends_double_consonant(bytes) && !matches!(bytes[n - 1], b'l' | b's' | b'z') && n > 3 {
        return stem[..n - 1].to_string();
    }
    if measure(bytes) == 1 && ends_cvc(bytes) {
        return format!("{stem}e");
    }
    stem.to_string()
}

fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

fn has_vowel(stem: &str) -> bool {
    let w = stem.as_bytes();
    (0..w.len()).any(|i| !is_consonant(w, i))
}

/// Number of vowel-consonant sequences in the word.
fn measure(w: &[u8]) -> usize {
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..w.len() {
        let consonant = is_consonant(w, i);
        if consonant && prev_vowel {
            m += 1;
        }
        prev_vowel = !consonant;
    }
    m
}

fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::stopwords::StopwordList;

    fn lemma(word: &str) -> String {
        lemma_of(word).unwrap_or_else(|| word.to_string())
    }

    #[test]
    fn test_plural_nouns() {
        assert_eq!(lemma("cars"), "car");
        assert_eq!(lemma("symbols"), "symbol");
        assert_eq!(lemma("stories"), "story");
        assert_eq!(lemma("classes"), "class");
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("watches"), "watch");
        assert_eq!(lemma("cases"), "case");
        assert_eq!(lemma("lies"), "lie");
    }

    #[test]
    fn test_verb_inflections() {
        assert_eq!(lemma("running"), "run");
        assert_eq!(lemma("making"), "make");
        assert_eq!(lemma("visiting"), "visit");
        assert_eq!(lemma("reported"), "report");
        assert_eq!(lemma("hoped"), "hope");
        assert_eq!(lemma("stopped"), "stop");
        assert_eq!(lemma("cried"), "cry");
        assert_eq!(lemma("filled"), "fill");
    }

    #[test]
    fn test_irregular_forms() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("went"), "go");
        assert_eq!(lemma("analyses"), "analysis");
    }

    #[test]
    fn test_guarded_words_unchanged() {
        for word in ["news", "bus", "glass", "analysis", "thing", "string", "need", "used", "add"] {
            assert_eq!(lemma(word), word, "{word} should be its own lemma");
        }
    }

    #[test]
    fn test_multi_pass_settles() {
        // meetings -> meeting -> meet
        assert_eq!(lemma("meetings"), "meet");
    }

    #[test]
    fn test_every_lemma_is_a_fixed_point() {
        let words = [
            "running", "cars", "better", "stories", "meetings", "classes", "buses", "hopping",
            "agreed", "united", "politics", "leaves", "studies", "housing", "reported", "taxes",
            "thieves", "happened", "governments", "elections", "claimed", "officials",
        ];
        for word in words {
            let once = lemma(word);
            assert_eq!(lemma(&once), once, "lemma of {word} is not stable");
        }
    }

    #[test]
    fn test_lemmatize_keeps_token_when_lemma_is_stopword() {
        let stopwords = StopwordSet::load(StopwordList::Nltk);
        let out = lemmatize(vec!["others".to_string(), "cars".to_string()], &stopwords);
        assert_eq!(out, vec!["others", "car"]);
    }

    #[test]
    fn test_non_ascii_word_is_its_own_lemma() {
        // U+0820 encodes as E0 A0 A0: equal trailing bytes before "ing".
        for word in ["ab\u{820}ing", "caf\u{e9}s", "\u{820}\u{820}ed"] {
            assert_eq!(lemma_of(word).as_deref(), Some(word));
        }
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure(b"tr"), 0);
        assert_eq!(measure(b"trouble"), 1);
        assert_eq!(measure(b"oaten"), 2);
    }
}
