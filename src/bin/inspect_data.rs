use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use newsprice::application::pipeline::{Source, inspect};
use newsprice::config::Config;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Kind {
    Sentiment,
    Price,
}

/// Report missing values, outliers, date problems and schema mismatches
/// for the input files without training.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which table to inspect. Both when omitted.
    #[arg(long, value_enum)]
    kind: Option<Kind>,

    /// File to inspect instead of the configured path (requires --kind)
    #[arg(long, requires = "kind")]
    path: Option<PathBuf>,

    /// Date format override
    #[arg(long)]
    date_format: Option<String>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let targets = match args.kind {
        Some(Kind::Sentiment) => vec![Source::Sentiment],
        Some(Kind::Price) => vec![Source::Price],
        None => vec![Source::Sentiment, Source::Price],
    };

    for source in targets {
        let (default_path, default_format) = match source {
            Source::Sentiment => (
                &config.data.sentiment_path,
                &config.data.sentiment_date_format,
            ),
            Source::Price => (&config.data.price_path, &config.data.price_date_format),
        };
        let path = args.path.clone().unwrap_or_else(|| default_path.clone());
        let format = args.date_format.as_deref().unwrap_or(default_format);

        let report = inspect(&path, source, format)
            .with_context(|| format!("Failed to inspect {:?}", path))?;
        println!("{report}\n");
    }
    Ok(())
}
