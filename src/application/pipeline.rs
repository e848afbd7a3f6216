//! End-to-end batch pipeline: load, inspect, clean, validate, align, train, persist.
//!
//! Every stage consumes the full output of the previous one. Cleaning and
//! validation problems are counted in the returned reports and the run keeps
//! going with whatever rows survive; only unreadable inputs, missing required
//! columns and training failures abort a run.

use crate::application::data::aligner::{AlignmentStats, merge};
use crate::application::data::cleaner::{clean_data, remove_duplicates};
use crate::application::data::extract::{price_records, sentiment_records};
use crate::application::data::loader::load_table;
use crate::application::data::quality::{
    check_missing_values, detect_outliers, detect_outliers_in,
};
use crate::application::data::validation::{
    DateReport, SchemaMismatch, check_inconsistencies, normalize_dates,
};
use crate::application::ml::trainer::{TrainerConfig, TrainingOutcome, train};
use crate::config::DataEnvConfig;
use crate::domain::errors::PipelineError;
use crate::domain::records::{AlignedRecord, PriceRecord, SentimentRecord};
use crate::domain::repositories::DocumentStore;
use crate::domain::schema::{
    ADJ_CLOSE, ColumnSpec, PRICE_DATE, PRICE_SCHEMA, SENTIMENT_DATE, SENTIMENT_SCHEMA, Schema,
};
use crate::domain::table::Table;
use crate::infrastructure::ArtifactStore;
use crate::infrastructure::documents::{fetch_prices, fetch_sentiment};
use chrono::{Local, NaiveDate};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which of the two input tables a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Sentiment,
    Price,
}

impl Source {
    pub fn schema(&self) -> &'static Schema {
        match self {
            Self::Sentiment => &SENTIMENT_SCHEMA,
            Self::Price => &PRICE_SCHEMA,
        }
    }

    fn date_column(&self) -> &'static ColumnSpec {
        match self {
            Self::Sentiment => &SENTIMENT_DATE,
            Self::Price => &PRICE_DATE,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentiment => write!(f, "sentiment"),
            Self::Price => write!(f, "price"),
        }
    }
}

/// What happened to one input table on its way to typed records.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub source: Source,
    pub path: PathBuf,
    pub rows_loaded: usize,
    pub columns: usize,
    pub missing: Vec<(String, usize)>,
    pub outliers_removed: usize,
    pub duplicates_removed: usize,
    pub dates: DateReport,
    pub mismatches: Vec<SchemaMismatch>,
    /// Rows that survived cleaning but could not become records.
    pub rows_skipped: usize,
    pub records: usize,
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} table {:?}", self.source, self.path)?;
        writeln!(f, "Shape: ({}, {})", self.rows_loaded, self.columns)?;
        for (column, count) in self.missing.iter().filter(|(_, n)| *n > 0) {
            writeln!(f, "Missing values in '{column}': {count}")?;
        }
        writeln!(f, "Outlier rows: {}", self.outliers_removed)?;
        writeln!(f, "Duplicate rows: {}", self.duplicates_removed)?;
        writeln!(
            f,
            "Dates: {} unparseable, {} missing, {} in the future",
            self.dates.unparseable.len(),
            self.dates.missing.len(),
            self.dates.future.len()
        )?;
        for (row, raw) in &self.dates.unparseable {
            writeln!(f, "  row {row}: '{raw}'")?;
        }
        for mismatch in &self.mismatches {
            writeln!(f, "{mismatch}")?;
        }
        write!(
            f,
            "Records: {} ({} rows skipped)",
            self.records, self.rows_skipped
        )
    }
}

/// Result of a full training run.
pub struct PipelineReport {
    pub sentiment: TableReport,
    pub price: TableReport,
    pub alignment: AlignmentStats,
    pub outcome: TrainingOutcome,
    pub model_path: PathBuf,
}

/// Loads one file and runs it through inspection, cleaning and validation.
///
/// Outliers are detected on the raw table (every numeric column for sentiment,
/// adjusted close only for prices) and removed before exact duplicates;
/// dates are normalized on what remains. The returned table still holds
/// unparseable and future dates; they are reported, not dropped.
pub fn prepare_table(
    path: &Path,
    source: Source,
    date_format: &str,
    today: NaiveDate,
) -> Result<(Table, TableReport), PipelineError> {
    let raw = load_table(path)?;
    let (rows_loaded, columns) = raw.shape();

    let missing = check_missing_values(&raw);
    // Price files often carry OHLC and volume; only the target is screened
    let outliers = match source {
        Source::Sentiment => detect_outliers(&raw),
        Source::Price => detect_outliers_in(&raw, &ADJ_CLOSE.names()),
    };
    info!("Detected {} outlier rows in {} data", outliers.len(), source);

    let cleaned = clean_data(&raw, &outliers);
    let mut table = remove_duplicates(&cleaned);
    let duplicates_removed = cleaned.n_rows() - table.n_rows();

    let dates = normalize_dates(&mut table, source.date_column(), date_format, today)?;
    if !dates.future.is_empty() {
        warn!(
            "{} {} rows are dated after {}",
            dates.future.len(),
            source,
            today
        );
    }

    let mismatches = check_inconsistencies(&table, source.schema());

    let report = TableReport {
        source,
        path: path.to_path_buf(),
        rows_loaded,
        columns,
        missing,
        outliers_removed: outliers.len(),
        duplicates_removed,
        dates,
        mismatches,
        rows_skipped: 0,
        records: 0,
    };
    Ok((table, report))
}

/// Report only, for the inspection tool. Record extraction is attempted so
/// skipped rows are counted, but a missing required column is not fatal.
pub fn inspect(
    path: &Path,
    source: Source,
    date_format: &str,
) -> Result<TableReport, PipelineError> {
    let today = Local::now().date_naive();
    let (table, mut report) = prepare_table(path, source, date_format, today)?;
    let counts = match source {
        Source::Sentiment => {
            sentiment_records(&table).map(|e| (e.records.len(), e.skipped.len()))
        }
        Source::Price => price_records(&table).map(|e| (e.records.len(), e.skipped.len())),
    };
    match counts {
        Ok((records, skipped)) => {
            report.records = records;
            report.rows_skipped = skipped;
        }
        Err(e) => warn!("{}", e),
    }
    Ok(report)
}

/// Typed records of both inputs, with their preparation reports.
pub struct PreparedRecords {
    pub sentiment: Vec<SentimentRecord>,
    pub prices: Vec<PriceRecord>,
    pub sentiment_report: TableReport,
    pub price_report: TableReport,
}

/// Loads and cleans both input files into typed records.
pub fn load_records(
    data: &DataEnvConfig,
    today: NaiveDate,
) -> Result<PreparedRecords, PipelineError> {
    let (sentiment_table, mut sentiment_report) = prepare_table(
        &data.sentiment_path,
        Source::Sentiment,
        &data.sentiment_date_format,
        today,
    )?;
    let sentiment = sentiment_records(&sentiment_table)?;
    sentiment_report.records = sentiment.records.len();
    sentiment_report.rows_skipped = sentiment.skipped.len();

    let (price_table, mut price_report) = prepare_table(
        &data.price_path,
        Source::Price,
        &data.price_date_format,
        today,
    )?;
    let prices = price_records(&price_table)?;
    price_report.records = prices.records.len();
    price_report.rows_skipped = prices.skipped.len();

    Ok(PreparedRecords {
        sentiment: sentiment.records,
        prices: prices.records,
        sentiment_report,
        price_report,
    })
}

fn align_for_training(
    sentiment: &[SentimentRecord],
    prices: &[PriceRecord],
) -> Result<(Vec<AlignedRecord>, AlignmentStats), PipelineError> {
    let (aligned, stats) = merge(sentiment, prices);
    if aligned.len() < 2 {
        return Err(PipelineError::InsufficientData {
            needed: 2,
            available: aligned.len(),
        });
    }
    Ok((aligned, stats))
}

/// Full batch run from the configured files: prepare both tables, join on
/// date, train, and persist model and scaler together.
pub fn run_training(
    data: &DataEnvConfig,
    trainer: &TrainerConfig,
) -> Result<PipelineReport, PipelineError> {
    let prepared = load_records(data, Local::now().date_naive())?;

    let (aligned, alignment) = align_for_training(&prepared.sentiment, &prepared.prices)?;
    let outcome = train(&aligned, trainer)?;

    let store = ArtifactStore::new(&data.model_path);
    store.save(&outcome.artifact)?;
    info!(
        "Training complete. MAE {:.4} on {} held-out rows, model at {:?}",
        outcome.mae, outcome.n_test, data.model_path
    );

    Ok(PipelineReport {
        sentiment: prepared.sentiment_report,
        price: prepared.price_report,
        alignment,
        outcome,
        model_path: data.model_path.clone(),
    })
}

/// Trains from records previously published to a document store.
pub async fn run_training_from_store(
    store: &dyn DocumentStore,
    artifacts: &ArtifactStore,
    trainer: &TrainerConfig,
) -> anyhow::Result<(TrainingOutcome, AlignmentStats)> {
    let (sentiment, rejected_sentiment) = fetch_sentiment(store).await?;
    let (prices, rejected_prices) = fetch_prices(store).await?;
    for reason in rejected_sentiment.iter().chain(&rejected_prices) {
        warn!("Rejected stored document: {}", reason);
    }

    let (aligned, stats) = align_for_training(&sentiment, &prices)?;
    let outcome = train(&aligned, trainer)?;
    artifacts.save(&outcome.artifact)?;
    Ok((outcome, stats))
}
