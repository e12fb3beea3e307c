use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::model::{ScorerConfig, DEFAULT_FAKE_THRESHOLD};
use crate::pipeline::DEFAULT_MAX_CONTENT_CHARS;

pub const DEFAULT_MODEL_VERSION: &str = "baseline_v0.1";
pub const DEFAULT_DB_PATH: &str = "./history.db";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding vectorizer.json, classifier.json and metadata.json
    pub artifact_dir: PathBuf,
    /// Version reported when metadata.json is absent or has no version
    pub default_model_version: String,
    /// Minimum probability on FAKE needed to label a document FAKE
    pub fake_threshold: f64,
    /// Longest accepted document content, in characters
    pub max_content_length: usize,
    pub db_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default; malformed numbers are an error rather
    /// than a silent fallback.
    pub fn load() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let artifact_dir = var("VERACITY_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_artifact_dir);

        let default_model_version = var("VERACITY_MODEL_VERSION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string());

        let fake_threshold = match var("VERACITY_FAKE_THRESHOLD") {
            Some(raw) => parse_threshold(&raw)?,
            None => DEFAULT_FAKE_THRESHOLD,
        };

        let max_content_length = match var("VERACITY_MAX_CONTENT_LENGTH") {
            Some(raw) => {
                let n: usize = raw.trim().parse().with_context(|| {
                    format!("VERACITY_MAX_CONTENT_LENGTH must be a positive integer, got {raw:?}")
                })?;
                if n == 0 {
                    anyhow::bail!("VERACITY_MAX_CONTENT_LENGTH must be at least 1");
                }
                n
            }
            None => DEFAULT_MAX_CONTENT_CHARS,
        };

        Ok(Self {
            artifact_dir,
            default_model_version,
            fake_threshold,
            max_content_length,
            db_path: var("VERACITY_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
        })
    }

    /// Scorer settings derived from this configuration.
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig::from_dir(
            &self.artifact_dir,
            &self.default_model_version,
            self.fake_threshold,
        )
    }

    /// Check that the model artifacts exist before commands that need them.
    pub fn require_artifacts(&self) -> Result<()> {
        if !self.scorer_config().paths.required_present() {
            anyhow::bail!(
                "Model artifacts not found in {}\n\
                 Expected vectorizer.json and classifier.json.\n\
                 Set VERACITY_ARTIFACT_DIR to the directory your training run exported.",
                self.artifact_dir.display()
            );
        }
        Ok(())
    }
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("VERACITY_FAKE_THRESHOLD must be a number, got {raw:?}"))?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("VERACITY_FAKE_THRESHOLD must be within [0, 1], got {value}");
    }
    Ok(value)
}

/// Platform data directory, e.g. ~/.local/share/veracity/model_artifacts.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veracity")
        .join("model_artifacts")
}
