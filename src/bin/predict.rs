use anyhow::Result;
use clap::Parser;
use newsprice::application::ml::inference::InferenceAdapter;
use newsprice::config::Config;
use newsprice::domain::records::RawRecord;
use newsprice::infrastructure::ArtifactStore;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Predict the adjusted close for one news item.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model file (overrides MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Date of the news item, DD-MM-YYYY or YYYY-MM-DD
    #[arg(long)]
    date: String,

    #[arg(long, default_value = "")]
    news: String,

    #[arg(long, default_value = "0")]
    up: String,

    #[arg(long, default_value = "0")]
    constant: String,

    #[arg(long, default_value = "0")]
    down: String,

    #[arg(long, default_value = "0")]
    asset_comparison: String,

    #[arg(long, default_value = "0")]
    past: String,

    #[arg(long, default_value = "0")]
    future: String,

    /// Price sentiment label, e.g. positive, negative, neutral
    #[arg(long, default_value = "neutral")]
    sentiment: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let model_path = args.model.unwrap_or(config.data.model_path);

    let adapter = InferenceAdapter::new(
        ArtifactStore::new(model_path),
        config.data.sentiment_date_format,
    );

    let raw = RawRecord {
        date: args.date,
        news: args.news,
        price_direction_up: args.up,
        price_direction_constant: args.constant,
        price_direction_down: args.down,
        asset_comparison: args.asset_comparison,
        past_information: args.past,
        future_information: args.future,
        price_sentiment: args.sentiment,
    };

    println!("{}", adapter.respond(&raw));
    Ok(())
}
