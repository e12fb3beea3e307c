// System status: model state, normalizer profile, history size.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;
use crate::model::Scorer;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub model_loaded: bool,
    pub model_version: Option<String>,
    pub load_failure: Option<String>,
    pub artifact_dir: String,
    pub fake_threshold: f64,
    pub normalizer_ruleset: String,
    pub stopwords: String,
    pub vocabulary_size: Option<usize>,
    pub trained_on: Option<String>,
    pub trained_at: Option<String>,
    pub db_path: String,
    /// None when the history store is not initialized.
    pub predictions_stored: Option<i64>,
}

/// Gather status from the scorer and (if open) the history store.
pub async fn collect(
    scorer: &Scorer,
    config: &Config,
    db: Option<&Arc<dyn Database>>,
) -> Result<StatusReport> {
    let profile = scorer.normalizer_profile();
    let bundle = scorer.bundle();

    let predictions_stored = match db {
        Some(db) => Some(db.prediction_count().await?),
        None => None,
    };

    Ok(StatusReport {
        model_loaded: scorer.loaded(),
        model_version: scorer.model_version().map(str::to_string),
        load_failure: scorer.load_failure().map(|f| f.to_string()),
        artifact_dir: config.artifact_dir.display().to_string(),
        fake_threshold: scorer.threshold(),
        normalizer_ruleset: profile.ruleset,
        stopwords: profile.stopwords.to_string(),
        vocabulary_size: bundle.map(|b| b.vectorizer.vocabulary_size()),
        trained_on: bundle.and_then(|b| b.metadata.trained_on.clone()),
        trained_at: bundle.and_then(|b| b.metadata.trained_at.clone()),
        db_path: config.db_path.clone(),
        predictions_stored,
    })
}

/// Display system status to the terminal.
pub fn show(report: &StatusReport) {
    println!("{}", "=== Veracity Status ===".bold());

    if report.model_loaded {
        println!(
            "Model: {} {}",
            "loaded".green(),
            report.model_version.as_deref().unwrap_or("?")
        );
        if let Some(size) = report.vocabulary_size {
            println!("  Vocabulary: {} terms", size);
        }
        if let Some(trained_on) = &report.trained_on {
            println!("  Trained on: {}", trained_on);
        }
        if let Some(trained_at) = &report.trained_at {
            println!("  Trained at: {}", trained_at);
        }
    } else {
        println!("Model: {}", "not loaded".red());
        if let Some(reason) = &report.load_failure {
            println!("  Reason: {}", reason);
        }
    }
    println!("  Artifacts: {}", report.artifact_dir);
    println!("  FAKE threshold: {:.2}", report.fake_threshold);
    println!(
        "Normalizer: ruleset {} with {} stopwords",
        report.normalizer_ruleset, report.stopwords
    );

    match report.predictions_stored {
        Some(count) => {
            let file_size = std::fs::metadata(&report.db_path)
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "unknown".to_string());
            println!("History: {} ({})", report.db_path, file_size);
            println!("  Predictions stored: {}", count);
        }
        None => {
            println!("History: not initialized");
            println!("  Run `veracity init` to set up the database.");
        }
    }
}

/// True when the history database file exists.
pub fn history_initialized(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScorerConfig;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[tokio::test]
    async fn test_collect_unloaded_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_vars(|key| match key {
            "VERACITY_ARTIFACT_DIR" => Some(dir.path().display().to_string()),
            _ => None,
        })
        .unwrap();
        let scorer = Scorer::load(&ScorerConfig::from_dir(&config.artifact_dir, "v0", 0.6));

        let report = collect(&scorer, &config, None).await.unwrap();
        assert!(!report.model_loaded);
        assert!(report.model_version.is_none());
        assert!(report.load_failure.unwrap().contains("artifact not found"));
        assert_eq!(report.stopwords, "nltk");
        assert!(report.predictions_stored.is_none());
    }
}
