// Text normalization: the deterministic raw-text-to-token-string stage
// shared by training-time feature extraction and serving.

pub mod lemma;
pub mod normalizer;
pub mod stopwords;

pub use normalizer::{default_normalizer, normalize, Normalizer, NormalizerError, NormalizerProfile};
pub use stopwords::StopwordList;
