use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use truthlens::classifier::logistic::LogisticParams;
use truthlens::classifier::service::decode_document;
use truthlens::classifier::tfidf::VectorizerParams;
use truthlens::classifier::{artifact, metrics, ClassificationService, FittedModel, TrainingParams};
use truthlens::config::Config;
use truthlens::corpus::Corpus;
use truthlens::output::terminal;
use truthlens::text;

/// TruthLens: news credibility classification.
///
/// Trains a TF-IDF + logistic regression model on labeled articles and
/// reports, for any new document, how likely each label is.
#[derive(Parser)]
#[command(name = "truthlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from a CSV with `text` and `label` columns
    Train {
        /// Path to the training CSV
        #[arg(long)]
        data: PathBuf,

        /// Where to write the model artifact (default: TRUTHLENS_MODEL_PATH)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Drop terms found in more than this fraction of documents
        #[arg(long, default_value = "1.0")]
        max_df: f64,

        /// Drop terms found in fewer than this many documents
        #[arg(long, default_value = "1")]
        min_df: usize,

        /// Keep only the N most frequent terms
        #[arg(long)]
        max_features: Option<usize>,

        /// Disable English stemming
        #[arg(long)]
        no_stem: bool,

        /// Inverse regularization strength
        #[arg(long, default_value = "1.0")]
        c: f64,

        /// Optimizer iteration cap
        #[arg(long, default_value = "1000")]
        max_iter: usize,

        /// Hold out this fraction of rows and report accuracy on them
        /// (default 0: train on every row)
        #[arg(long, default_value = "0")]
        holdout: f64,
    },

    /// Classify a document (argument, --file, or stdin)
    Classify {
        /// The document text
        text: Option<String>,

        /// Read the document from a file instead
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the normalizer does to a piece of text
    Normalize {
        text: String,
    },

    /// Describe the stored model and its most indicative terms
    Inspect {
        /// Terms to list per class
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Serve the classification API over HTTP
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: TRUTHLENS_PORT or 8080)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: TRUTHLENS_BIND or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("truthlens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            out,
            max_df,
            min_df,
            max_features,
            no_stem,
            c,
            max_iter,
            holdout,
        } => {
            let config = Config::load()?;
            let out = out.unwrap_or(config.model_path);

            let corpus = Corpus::from_csv_path(&data)
                .with_context(|| format!("Failed to read training data from {}", data.display()))?;
            info!(
                documents = corpus.len(),
                dropped = corpus.dropped(),
                "Loaded training corpus"
            );
            if corpus.dropped() > 0 {
                println!(
                    "{}",
                    format!("Skipped {} rows with empty text or label", corpus.dropped()).dimmed()
                );
            }

            let (train, evaluation_set) = split_for_training(corpus, holdout)?;

            let params = TrainingParams {
                vectorizer: VectorizerParams {
                    max_df,
                    min_df,
                    max_features,
                    stem: !no_stem,
                },
                logistic: LogisticParams {
                    c,
                    max_iter,
                    ..LogisticParams::default()
                },
            };

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg} [{elapsed_precise}]")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(format!("Training on {} documents", train.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));

            // Fitting is CPU-bound; keep it off the async workers.
            let fitted = tokio::task::spawn_blocking(move || {
                FittedModel::fit_with_report(&train, &params)
            })
            .await?;
            spinner.finish_and_clear();
            let (model, report) = fitted?;

            terminal::display_training_report(&report, model.classes());

            if let Some(held) = evaluation_set {
                let evaluation = metrics::evaluate(&model, &held)?;
                terminal::display_evaluation(&evaluation);
            }

            let written = artifact::save_to_file(&model, &out)?;
            println!("Model saved to: {}", written.display());
            println!("\nNext: truthlens classify \"<article text>\"");
        }

        Commands::Classify { text, file, json } => {
            let config = Config::load()?;
            config.require_model()?;

            let document = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    decode_document(bytes)?
                }
                (None, None) => {
                    let mut bytes = Vec::new();
                    std::io::stdin()
                        .read_to_end(&mut bytes)
                        .context("Failed to read document from stdin")?;
                    decode_document(bytes)?
                }
            };

            let service = ClassificationService::new().with_max_input_chars(config.max_input_chars);
            service.load_file(&config.model_path)?;
            let prediction = service.predict(&document)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                terminal::display_prediction(&prediction, &document);
            }
        }

        Commands::Normalize { text } => {
            println!("{}", text::normalize(&text));
        }

        Commands::Inspect { top } => {
            let config = Config::load()?;
            config.require_model()?;
            let loaded = artifact::load_from_file(&config.model_path)?;
            println!("Model: {}", config.model_path.display());
            terminal::display_model_summary(&loaded.model, Some(loaded.trained_at), top);
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_model()?;

            let service = ClassificationService::new().with_max_input_chars(config.max_input_chars);
            service.load_file(&config.model_path)?;

            let bind = bind.unwrap_or(config.bind);
            let port = port.unwrap_or(config.port);
            truthlens::web::run_server(std::sync::Arc::new(service), &bind, port).await?;
        }
    }

    Ok(())
}

/// Split off an evaluation set only when a holdout fraction was requested.
fn split_for_training(corpus: Corpus, holdout: f64) -> Result<(Corpus, Option<Corpus>)> {
    if holdout > 0.0 {
        let (train, held) = corpus.split_holdout(holdout)?;
        Ok((train, Some(held)))
    } else {
        Ok((corpus, None))
    }
}
