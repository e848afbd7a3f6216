use anyhow::{Context, Result};
use clap::Parser;
use newsprice::application::data::aligner::merge;
use newsprice::application::pipeline::{load_records, run_training, run_training_from_store};
use newsprice::config::Config;
use newsprice::infrastructure::documents::{publish_prices, publish_sentiment};
use newsprice::infrastructure::{ArtifactStore, InMemoryDocumentStore};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the news sentiment price model", long_about = None)]
struct Args {
    /// Sentiment CSV (overrides SENTIMENT_DATA_PATH)
    #[arg(long)]
    sentiment: Option<PathBuf>,

    /// Price CSV (overrides PRICE_DATA_PATH)
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Output model file (overrides MODEL_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of trees in the random forest
    #[arg(long)]
    n_trees: Option<usize>,

    /// Seed for the split and the forest
    #[arg(long)]
    seed: Option<u64>,

    /// Share of aligned rows held out for evaluation
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Maximum depth of trees
    #[arg(long)]
    max_depth: Option<u16>,

    /// Minimum samples required to split an internal node
    #[arg(long)]
    min_split: Option<usize>,

    /// Publish cleaned records to a document store and train from what is read back
    #[arg(long)]
    via_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;

    if let Some(path) = args.sentiment {
        config.data.sentiment_path = path;
    }
    if let Some(path) = args.prices {
        config.data.price_path = path;
    }
    if let Some(path) = args.output {
        config.data.model_path = path;
    }
    let mut trainer = config.training.to_trainer_config();
    if let Some(n) = args.n_trees {
        trainer.n_trees = n;
    }
    if let Some(seed) = args.seed {
        trainer.seed = seed;
    }
    if let Some(fraction) = args.test_fraction {
        trainer.test_fraction = fraction;
    }
    if args.max_depth.is_some() {
        trainer.max_depth = args.max_depth;
    }
    if let Some(min_split) = args.min_split {
        trainer.min_samples_split = min_split;
    }

    info!("Starting training run: {:?}", trainer);

    if args.via_store {
        let prepared = load_records(&config.data, chrono::Local::now().date_naive())?;
        let (_, expected) = merge(&prepared.sentiment, &prepared.prices);

        let store = InMemoryDocumentStore::new();
        publish_sentiment(&store, &prepared.sentiment).await?;
        publish_prices(&store, &prepared.prices).await?;

        let artifacts = ArtifactStore::new(&config.data.model_path);
        let (outcome, stats) = run_training_from_store(&store, &artifacts, &trainer)
            .await
            .context("Training from document store failed")?;
        info!(
            "Aligned {} dates from the store ({} from files)",
            stats.matched, expected.matched
        );
        println!("Mean Absolute Error: {:.4}", outcome.mae);
        println!("Model and scaler saved to {:?}", artifacts.path());
        return Ok(());
    }

    let report = run_training(&config.data, &trainer).context("Training run failed")?;

    println!("{}", report.sentiment);
    println!("{}", report.price);
    println!(
        "Aligned dates: {} (unmatched: {} sentiment, {} price)",
        report.alignment.matched,
        report.alignment.unmatched_sentiment,
        report.alignment.unmatched_price
    );
    println!(
        "Train/test rows: {}/{}",
        report.outcome.n_train, report.outcome.n_test
    );
    println!("Mean Absolute Error: {:.4}", report.outcome.mae);
    println!("Model and scaler saved to {:?}", report.model_path);
    Ok(())
}
