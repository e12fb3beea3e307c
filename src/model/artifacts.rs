// Model artifact bundle: the fitted vectorizer, the fitted classifier and
// their metadata, loaded once from a directory of JSON files.
//
// Layout of an artifact directory:
//
//   vectorizer.json   vocabulary + idf table          (required)
//   classifier.json   class labels + linear weights   (required)
//   metadata.json     version, provenance, checksums  (optional)
//
// The bundle is immutable once built. Swapping models means building a new
// Scorer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::classifier::{Classifier, ClassifierArtifact};
use super::error::LoadFailure;
use super::scorer::Label;
use super::vectorizer::{TfidfVectorizer, VectorizerArtifact};
use crate::text::{Normalizer, NormalizerProfile};

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Where the three artifact files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// The standard file names inside one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }

    /// Check whether both required artifact files exist.
    pub fn required_present(&self) -> bool {
        self.vectorizer.exists() && self.classifier.exists()
    }
}

/// SHA-256 digests (lowercase hex) of the two required artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactChecksums {
    pub vectorizer: Option<String>,
    pub classifier: Option<String>,
}

/// Contents of `metadata.json`. Anything beyond the known keys (evaluation
/// metrics, training parameters) is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub trained_on: Option<String>,
    #[serde(default)]
    pub trained_at: Option<String>,
    #[serde(default)]
    pub normalizer: Option<NormalizerProfile>,
    #[serde(default)]
    pub checksums: Option<ArtifactChecksums>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The loaded, validated artifact triple plus everything derived from it.
#[derive(Debug)]
pub struct ModelArtifactBundle {
    pub vectorizer: TfidfVectorizer,
    pub classifier: Box<dyn Classifier>,
    pub metadata: ModelMetadata,
    pub model_version: String,
    pub normalizer: Normalizer,
    fake_idx: usize,
    real_idx: usize,
}

impl ModelArtifactBundle {
    /// Assemble a bundle from in-memory parts, applying the same consistency
    /// checks as loading from disk.
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: Box<dyn Classifier>,
        metadata: ModelMetadata,
        default_model_version: &str,
    ) -> Result<Self, LoadFailure> {
        let (fake_idx, real_idx) = label_indices(classifier.classes())?;

        if let Some(width) = classifier.n_features() {
            if width != vectorizer.dim() {
                return Err(LoadFailure::Invalid(format!(
                    "classifier expects {width} features, vectorizer produces {}",
                    vectorizer.dim()
                )));
            }
        }

        let profile = metadata.normalizer.clone().unwrap_or_default();
        let normalizer = Normalizer::new(profile)?;

        let model_version = metadata
            .model_version
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_model_version.to_string());

        Ok(Self {
            vectorizer,
            classifier,
            metadata,
            model_version,
            normalizer,
            fake_idx,
            real_idx,
        })
    }

    /// Position of `label` in the classifier's class list.
    pub fn class_index(&self, label: Label) -> usize {
        match label {
            Label::Fake => self.fake_idx,
            Label::Real => self.real_idx,
        }
    }

    /// The label at a classifier class index.
    pub fn label_at(&self, class_idx: usize) -> Option<Label> {
        if class_idx == self.fake_idx {
            Some(Label::Fake)
        } else if class_idx == self.real_idx {
            Some(Label::Real)
        } else {
            None
        }
    }
}

/// The class list must be exactly {REAL, FAKE}.
fn label_indices(classes: &[String]) -> Result<(usize, usize), LoadFailure> {
    if classes.len() != 2 {
        return Err(LoadFailure::Invalid(format!(
            "expected exactly 2 classes, found {:?}",
            classes
        )));
    }
    let find = |label: Label| {
        classes
            .iter()
            .position(|c| c == label.as_str())
            .ok_or_else(|| {
                LoadFailure::Invalid(format!("class {} missing from {:?}", label, classes))
            })
    };
    Ok((find(Label::Fake)?, find(Label::Real)?))
}

/// Read, verify and validate the artifact bundle.
///
/// Missing or broken required files are a `LoadFailure`. A missing or
/// unreadable metadata file is not: the default version is used instead.
/// Readable metadata with a malformed normalizer profile or checksum table
/// is a `LoadFailure`.
pub fn load_bundle(
    paths: &ArtifactPaths,
    default_model_version: &str,
) -> Result<ModelArtifactBundle, LoadFailure> {
    for path in [&paths.vectorizer, &paths.classifier] {
        if !path.exists() {
            return Err(LoadFailure::MissingArtifact(path.clone()));
        }
    }

    info!(path = %paths.vectorizer.display(), "Loading TF-IDF vectorizer");
    let vectorizer_bytes = read_file(&paths.vectorizer)?;
    let vectorizer_artifact: VectorizerArtifact = parse_json(&paths.vectorizer, &vectorizer_bytes)?;

    info!(path = %paths.classifier.display(), "Loading classifier");
    let classifier_bytes = read_file(&paths.classifier)?;
    let classifier_artifact: ClassifierArtifact = parse_json(&paths.classifier, &classifier_bytes)?;

    let metadata = load_metadata(&paths.metadata)?;

    if let Some(checksums) = &metadata.checksums {
        verify_checksum(&paths.vectorizer, &vectorizer_bytes, checksums.vectorizer.as_deref())?;
        verify_checksum(&paths.classifier, &classifier_bytes, checksums.classifier.as_deref())?;
    }

    let vectorizer = TfidfVectorizer::from_artifact(vectorizer_artifact).map_err(LoadFailure::Invalid)?;
    let classifier = classifier_artifact.build().map_err(LoadFailure::Invalid)?;

    ModelArtifactBundle::new(vectorizer, classifier, metadata, default_model_version)
}

/// Metadata read. An absent, unreadable or non-JSON file yields the default.
/// Once the file parses as a JSON object, the normalizer profile and the
/// checksums must deserialize exactly; descriptive fields stay lenient.
fn load_metadata(path: &Path) -> Result<ModelMetadata, LoadFailure> {
    if !path.exists() {
        info!(path = %path.display(), "No model metadata file, using default version");
        return Ok(ModelMetadata::default());
    }
    let parsed = fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).map_err(|e| e.to_string()));
    match parsed {
        Ok(Value::Object(fields)) => metadata_from_fields(path, fields),
        Ok(_) => {
            warn!(path = %path.display(), "Model metadata is not a JSON object, using default version");
            Ok(ModelMetadata::default())
        }
        Err(reason) => {
            warn!(path = %path.display(), %reason, "Unreadable model metadata, using default version");
            Ok(ModelMetadata::default())
        }
    }
}

fn metadata_from_fields(path: &Path, mut fields: Map<String, Value>) -> Result<ModelMetadata, LoadFailure> {
    let normalizer = strict_field::<NormalizerProfile>(path, &mut fields, "normalizer")?;
    let checksums = strict_field::<ArtifactChecksums>(path, &mut fields, "checksums")?;
    Ok(ModelMetadata {
        model_version: lenient_string(path, &mut fields, "model_version"),
        trained_on: lenient_string(path, &mut fields, "trained_on"),
        trained_at: lenient_string(path, &mut fields, "trained_at"),
        normalizer,
        checksums,
        extra: fields,
    })
}

fn strict_field<T: DeserializeOwned>(
    path: &Path,
    fields: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, LoadFailure> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| LoadFailure::Malformed {
                path: path.to_path_buf(),
                reason: format!("{key}: {e}"),
            }),
    }
}

fn lenient_string(path: &Path, fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(value)) => Some(value),
        None | Some(Value::Null) => None,
        Some(other) => {
            warn!(path = %path.display(), field = key, value = %other, "Ignoring non-string metadata field");
            None
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, LoadFailure> {
    fs::read(path).map_err(|e| LoadFailure::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, LoadFailure> {
    serde_json::from_slice(bytes).map_err(|e| LoadFailure::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn verify_checksum(path: &Path, bytes: &[u8], expected: Option<&str>) -> Result<(), LoadFailure> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let found = sha256_hex(bytes);
    if !found.eq_ignore_ascii_case(expected.trim()) {
        return Err(LoadFailure::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            found,
        });
    }
    Ok(())
}

/// Lowercase hex SHA-256 of a byte slice.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
