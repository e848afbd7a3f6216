//! Date normalization and schema consistency checks.
//!
//! Nothing here removes rows. Unparseable and future dates, and column type
//! mismatches, are reported so the caller can decide what to do.

use crate::domain::errors::PipelineError;
use crate::domain::schema::{
    ColumnSpec, PRICE_DATE, PRICE_SCHEMA, SENTIMENT_DATE, SENTIMENT_SCHEMA, Schema,
};
use crate::domain::table::{LogicalType, Table, Value};
use chrono::{Local, NaiveDate};
use std::fmt;
use tracing::{info, warn};

/// Outcome of normalizing one date column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateReport {
    /// Row ids and raw text of values that did not parse.
    pub unparseable: Vec<(usize, String)>,
    /// Row ids with no date at all.
    pub missing: Vec<usize>,
    /// Row ids whose date is after the validation date.
    pub future: Vec<usize>,
}

/// A column whose actual type differs from the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub column: String,
    pub expected: LogicalType,
    pub found: LogicalType,
}

impl fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data type inconsistency for column '{}': Expected {}, Found {}",
            self.column, self.expected, self.found
        )
    }
}

/// Parses the date column located by `spec` under `format`, in place.
///
/// Values that fail to parse are kept as [`Value::UnparseableDate`]. Dates
/// strictly after `today` are reported as future dates.
pub fn normalize_dates(
    table: &mut Table,
    spec: &ColumnSpec,
    format: &str,
    today: NaiveDate,
) -> Result<DateReport, PipelineError> {
    let idx = spec.locate(table).ok_or_else(|| PipelineError::MissingColumn {
        table: "input".to_string(),
        column: spec.name.to_string(),
    })?;

    let row_ids = table.row_ids().to_vec();
    let column = table.column_mut(idx);
    let mut report = DateReport::default();

    for (pos, value) in column.values.iter_mut().enumerate() {
        let parsed = match &*value {
            Value::Null => {
                report.missing.push(row_ids[pos]);
                continue;
            }
            Value::Date(d) => Value::Date(*d),
            other => {
                let raw = other.to_string();
                match NaiveDate::parse_from_str(&raw, format) {
                    Ok(d) => Value::Date(d),
                    Err(_) => {
                        report.unparseable.push((row_ids[pos], raw.clone()));
                        Value::UnparseableDate(raw)
                    }
                }
            }
        };

        if let Value::Date(d) = parsed {
            if d > today {
                report.future.push(row_ids[pos]);
            }
        }
        *value = parsed;
    }
    column.dtype = LogicalType::Date;

    info!(
        "Converted '{}' to dates. Unparseable: {}, missing: {}",
        column.name,
        report.unparseable.len(),
        report.missing.len()
    );
    for (id, raw) in &report.unparseable {
        warn!("Row {}: unparseable date '{}' (expected {})", id, raw, format);
    }
    info!("Found {} future dates in the dataset.", report.future.len());

    Ok(report)
}

/// Normalizes the sentiment date column against the current local date.
pub fn consistency_in_dates_sentiment(
    table: &mut Table,
    format: &str,
) -> Result<DateReport, PipelineError> {
    normalize_dates(table, &SENTIMENT_DATE, format, Local::now().date_naive())
}

/// Normalizes the price date column against the current local date.
pub fn consistency_in_dates_price(
    table: &mut Table,
    format: &str,
) -> Result<DateReport, PipelineError> {
    normalize_dates(table, &PRICE_DATE, format, Local::now().date_naive())
}

/// Compares each schema column present in `table` with its actual type.
/// One entry per mismatch, in schema declaration order.
pub fn check_inconsistencies(table: &Table, schema: &Schema) -> Vec<SchemaMismatch> {
    let mismatches: Vec<SchemaMismatch> = schema
        .columns
        .iter()
        .filter_map(|spec| {
            let idx = spec.locate(table)?;
            let column = &table.columns()[idx];
            (column.dtype != spec.dtype).then(|| SchemaMismatch {
                column: column.name.clone(),
                expected: spec.dtype,
                found: column.dtype,
            })
        })
        .collect();

    info!(
        "Data type inconsistencies found in {} table: {}",
        schema.name,
        mismatches.len()
    );
    for m in &mismatches {
        warn!("{}", m);
    }
    mismatches
}

pub fn check_data_types_sentiment(table: &Table) -> Vec<SchemaMismatch> {
    check_inconsistencies(table, &SENTIMENT_SCHEMA)
}

pub fn check_data_types_price(table: &Table) -> Vec<SchemaMismatch> {
    check_inconsistencies(table, &PRICE_SCHEMA)
}
