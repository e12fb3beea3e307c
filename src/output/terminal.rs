// Colored terminal output for predictions and history.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use crate::db::PredictionRecord;
use crate::model::Label;
use crate::pipeline::{Classification, ClassifyError};

/// Display one classification in detail.
pub fn display_classification(classification: &Classification, show_normalized: bool) {
    let prediction = &classification.prediction;
    println!(
        "\n{}",
        format!("=== Prediction (model {}) ===", classification.model_version).bold()
    );
    println!(
        "  Label: {}  ({:.1}% confidence)",
        colorize_label(prediction.label),
        prediction.probability * 100.0
    );

    match &prediction.top_tokens {
        Some(tokens) if !tokens.is_empty() => {
            println!("  Top {} tokens: {}", prediction.label, tokens.join(", ").cyan());
        }
        _ => println!("  Top tokens: {}", "unavailable".dimmed()),
    }

    if show_normalized {
        let preview = super::truncate_chars(&classification.normalized, 200);
        println!("  Normalized: {}", preview.dimmed());
    }
}

/// One line per batch entry, in input order.
pub fn display_batch_results(results: &[Result<Classification, ClassifyError>]) {
    println!(
        "\n{}",
        format!("=== Batch Results ({} documents) ===", results.len()).bold()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(c) => println!(
                "  {:>5}. {:<4}  {:>6.4}  {}",
                i + 1,
                colorize_label(c.prediction.label),
                c.prediction.probability,
                c.prediction
                    .top_tokens
                    .as_ref()
                    .map(|t| t.join(" "))
                    .unwrap_or_default()
                    .dimmed(),
            ),
            Err(e) => println!("  {:>5}. {}  {}", i + 1, "ERR".red(), e),
        }
    }

    let fake = results
        .iter()
        .filter(|r| matches!(r, Ok(c) if c.prediction.label == Label::Fake))
        .count();
    let real = results
        .iter()
        .filter(|r| matches!(r, Ok(c) if c.prediction.label == Label::Real))
        .count();
    let failed = results.iter().filter(|r| r.is_err()).count();

    println!();
    println!(
        "  {} {} fake  {} {} real",
        "!".red().bold(),
        fake,
        "+".green(),
        real
    );
    if failed > 0 {
        println!("  {} {} failed", "~".yellow(), failed);
    }
}

/// Display stored predictions, newest first.
pub fn display_history(records: &[PredictionRecord]) {
    if records.is_empty() {
        println!("No predictions stored yet. Run `veracity predict` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Prediction History ({} most recent) ===", records.len()).bold()
    );
    println!();

    println!(
        "  {:<20}  {:<5}  {:>6}  {:<14}  {}",
        "When".dimmed(),
        "Label".dimmed(),
        "Prob".dimmed(),
        "Model".dimmed(),
        "Text".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for record in records {
        let text = match &record.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => record.content.clone(),
        };
        let preview = super::truncate_chars(&super::single_line(&text), 60);
        // Drop fractional seconds and the zone suffix.
        let when: String = record.created_at.chars().take(19).collect();
        println!(
            "  {:<20}  {:<5}  {:>6.4}  {:<14}  {}",
            when,
            colorize_label(record.label),
            record.probability,
            record.model_version,
            preview,
        );
    }
    println!();
}

/// Colorize a label: FAKE red, REAL green.
fn colorize_label(label: Label) -> colored::ColoredString {
    match label {
        Label::Fake => label.as_str().red().bold(),
        Label::Real => label.as_str().green(),
    }
}
