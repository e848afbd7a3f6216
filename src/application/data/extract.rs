//! Conversion of validated tables into typed records.

use crate::domain::errors::PipelineError;
use crate::domain::records::{Indicators, PriceRecord, SentimentRecord};
use crate::domain::schema::{
    ADJ_CLOSE, ColumnSpec, INDICATOR_COLUMNS, NEWS, PRICE_DATE, PRICE_SENTIMENT, SENTIMENT_DATE,
};
use crate::domain::table::{Table, Value};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Records built from a table, plus the rows that could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    /// Row id and reason for every row left out.
    pub skipped: Vec<(usize, String)>,
}

fn require(table: &Table, spec: &ColumnSpec, table_name: &str) -> Result<usize, PipelineError> {
    spec.locate(table).ok_or_else(|| PipelineError::MissingColumn {
        table: table_name.to_string(),
        column: spec.name.to_string(),
    })
}

fn date_cell(value: &Value) -> Result<NaiveDate, String> {
    match value {
        Value::Date(d) => Ok(*d),
        Value::UnparseableDate(raw) => Err(format!("unparseable date '{raw}'")),
        Value::Null => Err("missing date".to_string()),
        other => Err(format!("date column not normalized ('{other}')")),
    }
}

fn flag_cell(value: &Value) -> Option<i64> {
    match value {
        Value::Int(v) => Some(*v),
        Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
        Value::Text(s) => s.parse().ok(),
        _ => None,
    }
}

fn report<T>(kind: &str, extraction: &Extraction<T>) {
    info!(
        "Extracted {} {} records ({} skipped)",
        extraction.records.len(),
        kind,
        extraction.skipped.len()
    );
    for (id, reason) in &extraction.skipped {
        warn!("Skipping {} row {}: {}", kind, id, reason);
    }
}

/// Builds sentiment records from a table whose date column was normalized.
pub fn sentiment_records(table: &Table) -> Result<Extraction<SentimentRecord>, PipelineError> {
    let date_idx = require(table, &SENTIMENT_DATE, "sentiment")?;
    let label_idx = require(table, &PRICE_SENTIMENT, "sentiment")?;
    let news_idx = NEWS.locate(table);
    let mut flag_idx = [0usize; 6];
    for (slot, spec) in flag_idx.iter_mut().zip(INDICATOR_COLUMNS.iter()) {
        *slot = require(table, spec, "sentiment")?;
    }

    let mut extraction = Extraction {
        records: Vec::with_capacity(table.n_rows()),
        skipped: Vec::new(),
    };

    for (pos, &row_id) in table.row_ids().iter().enumerate() {
        let date = match date_cell(table.value(pos, date_idx)) {
            Ok(d) => d,
            Err(reason) => {
                extraction.skipped.push((row_id, reason));
                continue;
            }
        };

        let mut values = [0i64; 6];
        let mut bad_flag = None;
        for (i, &col) in flag_idx.iter().enumerate() {
            match flag_cell(table.value(pos, col)) {
                Some(v) => values[i] = v,
                None => {
                    bad_flag = Some(INDICATOR_COLUMNS[i].name);
                    break;
                }
            }
        }
        if let Some(name) = bad_flag {
            extraction
                .skipped
                .push((row_id, format!("'{name}' is not an integer")));
            continue;
        }

        let indicators = match Indicators::from_values(values) {
            Ok(ind) => ind,
            Err(e) => {
                extraction.skipped.push((row_id, e.to_string()));
                continue;
            }
        };

        let news = news_idx
            .map(|idx| table.value(pos, idx).to_string())
            .unwrap_or_default();
        let price_sentiment = table.value(pos, label_idx).to_string();

        extraction.records.push(SentimentRecord {
            date,
            news,
            indicators,
            price_sentiment,
        });
    }

    report("sentiment", &extraction);
    Ok(extraction)
}

/// Builds price records from a table whose date column was normalized.
pub fn price_records(table: &Table) -> Result<Extraction<PriceRecord>, PipelineError> {
    let date_idx = require(table, &PRICE_DATE, "price")?;
    let close_idx = require(table, &ADJ_CLOSE, "price")?;

    let mut extraction = Extraction {
        records: Vec::with_capacity(table.n_rows()),
        skipped: Vec::new(),
    };

    for (pos, &row_id) in table.row_ids().iter().enumerate() {
        let date = match date_cell(table.value(pos, date_idx)) {
            Ok(d) => d,
            Err(reason) => {
                extraction.skipped.push((row_id, reason));
                continue;
            }
        };
        match table.value(pos, close_idx).as_f64().filter(|v| v.is_finite()) {
            Some(adj_close) => extraction.records.push(PriceRecord { date, adj_close }),
            None => extraction
                .skipped
                .push((row_id, "missing or non-numeric Adj Close".to_string())),
        }
    }

    report("price", &extraction);
    Ok(extraction)
}
