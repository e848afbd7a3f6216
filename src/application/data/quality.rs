//! Data quality checks: missing values and z-score outliers.

use crate::domain::table::{Column, Table, Value};
use statrs::statistics::Statistics;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A value is an outlier when its |z-score| is strictly greater than this.
pub const Z_SCORE_THRESHOLD: f64 = 3.0;

/// Count of missing cells per column, in column order.
pub fn check_missing_values(table: &Table) -> Vec<(String, usize)> {
    let counts: Vec<(String, usize)> = table
        .columns()
        .iter()
        .map(|c| {
            (
                c.name.clone(),
                c.values.iter().filter(|v| v.is_missing()).count(),
            )
        })
        .collect();

    for (name, count) in &counts {
        info!("Missing values in '{}': {}", name, count);
    }
    counts
}

/// Row ids whose value in any numeric column lies more than
/// [`Z_SCORE_THRESHOLD`] population standard deviations from the column mean.
///
/// Missing cells are excluded from the column statistics and never flagged.
/// A column with zero variance flags nothing.
pub fn detect_outliers(table: &Table) -> BTreeSet<usize> {
    detect_outliers_where(table, |_| true)
}

/// Same rule as [`detect_outliers`], restricted to the numeric columns whose
/// name is in `names`. Other columns never flag a row.
pub fn detect_outliers_in(table: &Table, names: &[&str]) -> BTreeSet<usize> {
    detect_outliers_where(table, |c| names.contains(&c.name.as_str()))
}

fn detect_outliers_where(table: &Table, include: impl Fn(&Column) -> bool) -> BTreeSet<usize> {
    let mut outliers = BTreeSet::new();

    let numeric: Vec<_> = table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric() && include(c))
        .collect();
    debug!(
        "Numerical columns for outlier detection: {:?}",
        numeric.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );

    for column in numeric {
        let present: Vec<f64> = column
            .values
            .iter()
            .filter_map(Value::as_f64)
            .filter(|x| x.is_finite())
            .collect();
        if present.is_empty() {
            continue;
        }

        let mean = present.iter().mean();
        let std_dev = present.iter().population_std_dev();
        if std_dev <= 0.0 || !std_dev.is_finite() {
            debug!("Column '{}' has zero variance, skipping", column.name);
            continue;
        }

        for (pos, value) in column.values.iter().enumerate() {
            if let Some(x) = value.as_f64() {
                let z = (x - mean) / std_dev;
                if z.abs() > Z_SCORE_THRESHOLD {
                    outliers.insert(table.row_ids()[pos]);
                }
            }
        }
    }

    info!("Outliers detected: {} rows", outliers.len());
    outliers
}
