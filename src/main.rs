use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use veracity::config::Config;
use veracity::db::{self, PredictionRecord};
use veracity::model::Scorer;
use veracity::output::terminal;
use veracity::pipeline::{self, Document};
use veracity::{status, text};

/// Veracity: classify short news documents as REAL or FAKE.
///
/// Normalizes text, projects it onto a fixed TF-IDF vocabulary and scores it
/// with a pre-trained linear classifier.
#[derive(Parser)]
#[command(name = "veracity", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the prediction history database
    Init,

    /// Print the normalized form of a piece of text
    Normalize {
        /// The raw text to normalize
        text: String,
    },

    /// Classify a single document
    Predict {
        /// Document title (optional)
        #[arg(long)]
        title: Option<String>,

        /// Document body
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        /// Read the document body from a file instead
        #[arg(long)]
        file: Option<PathBuf>,

        /// Also print the normalized text the model saw
        #[arg(long)]
        show_normalized: bool,

        /// Don't record the prediction in history
        #[arg(long)]
        no_save: bool,
    },

    /// Classify every document in a JSON Lines file
    Batch {
        /// Input file, one {"title": ..., "content": ...} object per line
        input: PathBuf,

        /// Number of documents to classify in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Write results as JSON Lines to this file instead of the terminal
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show recent predictions
    History {
        /// Number of predictions to show (default: 20)
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show system status (model state, normalizer profile, history size)
    Status,

    /// Serve the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("veracity=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Veracity history database...");
            let config = Config::load()?;
            let db = db::initialize_database(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            if config.require_artifacts().is_err() {
                println!(
                    "\n{} no model artifacts in {}",
                    "Note:".yellow(),
                    config.artifact_dir.display()
                );
                println!("  Set VERACITY_ARTIFACT_DIR before running `veracity predict`.");
            }
        }

        Commands::Normalize { text } => {
            // Same profile as the loaded model when one is configured.
            let config = Config::load()?;
            let scorer = Scorer::load(&config.scorer_config());
            let normalized = match scorer.normalizer() {
                Some(normalizer) => normalizer.normalize(&text),
                None => text::default_normalizer()?.normalize(&text),
            };
            println!("{normalized}");
        }

        Commands::Predict {
            title,
            content,
            file,
            show_normalized,
            no_save,
        } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let scorer = load_scorer(&config)?;

            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("Provide --content or --file"),
            };
            let document = Document::new(title, content);

            let classification =
                pipeline::classify_document(&scorer, &document, config.max_content_length)?;
            terminal::display_classification(&classification, show_normalized);

            if !no_save {
                let record = PredictionRecord::new(&document, &classification);
                save_best_effort(&config, &record).await;
            }
        }

        Commands::Batch {
            input,
            concurrency,
            output,
        } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let scorer = Arc::new(load_scorer(&config)?);

            let documents = pipeline::read_jsonl(&input)?;
            println!(
                "Classifying {} documents ({} concurrent)...",
                documents.len(),
                concurrency
            );
            let results = pipeline::classify_batch(
                scorer,
                documents,
                concurrency,
                config.max_content_length,
                true,
            )
            .await;

            match output {
                Some(path) => {
                    write_batch_output(&path, &results)?;
                    let failed = results.iter().filter(|r| r.is_err()).count();
                    println!(
                        "Wrote {} results to {} ({} failed)",
                        results.len(),
                        path.display(),
                        failed
                    );
                }
                None => terminal::display_batch_results(&results),
            }
        }

        Commands::History { limit } => {
            let config = Config::load()?;
            let db = db::open_database(&config.db_path)?;
            let records = db.fetch_history(limit).await?;
            terminal::display_history(&records);
        }

        Commands::Status => {
            let config = Config::load()?;
            let scorer = Scorer::load(&config.scorer_config());
            let db = if status::history_initialized(&config.db_path) {
                Some(db::open_database(&config.db_path)?)
            } else {
                None
            };
            let report = status::collect(&scorer, &config, db.as_ref()).await?;
            status::show(&report);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let scorer = Arc::new(Scorer::load(&config.scorer_config()));
            if !scorer.loaded() {
                warn!("Serving without a model; /api/v1/predict will return 503");
            }
            let db = db::initialize_database(&config.db_path)?;
            veracity::web::run_server(config, scorer, db, port, &bind).await?;
        }
    }

    Ok(())
}

/// Load the scorer, turning an Unloaded state into a command error.
fn load_scorer(config: &Config) -> Result<Scorer> {
    let scorer = Scorer::load(&config.scorer_config());
    if let Some(failure) = scorer.load_failure() {
        anyhow::bail!(
            "Model artifacts in {} could not be loaded: {}",
            config.artifact_dir.display(),
            failure
        );
    }
    Ok(scorer)
}

/// Record a prediction; failures are logged, never fatal.
async fn save_best_effort(config: &Config, record: &PredictionRecord) {
    let result = match db::initialize_database(&config.db_path) {
        Ok(db) => db.insert_prediction(record).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => info!(prediction_id = %record.prediction_id, "Prediction saved to history"),
        Err(e) => warn!(error = %e, "Failed to save prediction to history"),
    }
}

/// One JSON object per input document, in input order.
fn write_batch_output(
    path: &std::path::Path,
    results: &[Result<pipeline::Classification, pipeline::ClassifyError>],
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    for (index, result) in results.iter().enumerate() {
        let line = match result {
            Ok(c) => serde_json::json!({
                "index": index,
                "label": c.prediction.label,
                "probability": db::models::round4(c.prediction.probability),
                "model_version": c.model_version,
                "top_tokens": c.prediction.top_tokens,
            }),
            Err(e) => serde_json::json!({
                "index": index,
                "error": e.to_string(),
            }),
        };
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
