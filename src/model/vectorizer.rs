// TF-IDF vectorizer, serving side.
//
// Mirrors scikit-learn's TfidfVectorizer.transform for the word analyzer:
// tokens are runs of two or more word characters, n-grams are joined with a
// single space, term counts are (optionally log-scaled,) multiplied by IDF
// and normalized. Terms outside the vocabulary are silently ignored, so a
// document with no known terms yields an empty vector.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A sparse feature vector: (feature index, value) pairs, ascending by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dot product with a dense weight row. Indices beyond the row are ignored.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(i, v)| weights.get(i).map(|w| w * v))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// On-disk form of the fitted vectorizer (`vectorizer.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term -> feature index.
    pub vocabulary: BTreeMap<String, usize>,
    /// IDF weight per feature index.
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

/// A validated, ready-to-use vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Option<Norm>,
    /// Index -> term, present only when the vocabulary covers every index
    /// exactly once.
    feature_names: Option<Vec<String>>,
}

impl TfidfVectorizer {
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, String> {
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({min_n}, {max_n})"));
        }
        if artifact.vocabulary.is_empty() {
            return Err("vectorizer vocabulary is empty".to_string());
        }
        if let Some(i) = artifact.idf.iter().position(|w| !w.is_finite()) {
            return Err(format!("non-finite idf weight at feature {i}"));
        }
        let dim = artifact.idf.len();
        if let Some((term, &idx)) = artifact.vocabulary.iter().find(|&(_, &idx)| idx >= dim) {
            return Err(format!(
                "vocabulary term {term:?} maps to feature {idx}, but only {dim} idf weights exist"
            ));
        }

        let feature_names = build_feature_names(&artifact.vocabulary, dim);

        Ok(Self {
            vocabulary: artifact.vocabulary.into_iter().collect(),
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            feature_names,
        })
    }

    /// Width of the feature space.
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index -> term map, when every feature index has exactly one term.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    /// Project a document into the feature space.
    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = analyze(text);
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();

        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&idx) = self.vocabulary.get(&term) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();

        let scale = match self.norm {
            Some(Norm::L2) => entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => entries.iter().map(|(_, v)| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            for (_, v) in &mut entries {
                *v /= scale;
            }
        }

        SparseVector { entries }
    }
}

/// Word analyzer equivalent to the `\b\w\w+\b` token pattern on lowercased text.
fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

fn build_feature_names(vocabulary: &BTreeMap<String, usize>, dim: usize) -> Option<Vec<String>> {
    if vocabulary.len() != dim {
        return None;
    }
    let mut names: Vec<Option<String>> = vec![None; dim];
    for (term, &idx) in vocabulary {
        let slot = names.get_mut(idx)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(term.clone());
    }
    names.into_iter().collect()
}
