// Batch classification: many documents through one shared Scorer.
//
// Prediction is CPU-bound and synchronous, so each document runs on the
// blocking pool. At most `concurrency` run at once and results come back in
// input order.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use super::classify::{classify_document, Classification, ClassifyError};
use super::document::Document;
use crate::model::{PredictError, Scorer};

pub async fn classify_batch(
    scorer: Arc<Scorer>,
    documents: Vec<Document>,
    concurrency: usize,
    max_content_chars: usize,
    show_progress: bool,
) -> Vec<Result<Classification, ClassifyError>> {
    let pb = if show_progress {
        let pb = ProgressBar::new(documents.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("  Classifying [{bar:30}] {pos}/{len} ({eta})") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<Result<Classification, ClassifyError>> =
        stream::iter(documents.into_iter().map(|document| {
            let scorer = Arc::clone(&scorer);
            async move {
                tokio::task::spawn_blocking(move || {
                    classify_document(&scorer, &document, max_content_chars)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(ClassifyError::Predict(PredictError::InferenceFailed(format!(
                        "classification task failed: {e}"
                    ))))
                })
            }
        }))
        .buffered(concurrency.max(1))
        .inspect(|_| pb.inc(1))
        .collect()
        .await;

    pb.finish_and_clear();
    results
}

/// Read documents from a JSON Lines file, one `{"title": ..., "content": ...}`
/// object per line. Blank lines are skipped.
pub fn read_jsonl(path: &Path) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;

    let mut documents = Vec::new();
    for (lineno, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let document: Document = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: not a document object", path.display(), lineno + 1))?;
        documents.push(document);
    }

    if documents.is_empty() {
        warn!(path = %path.display(), "Batch file contains no documents");
    }
    Ok(documents)
}
