use crate::domain::table::Table;
use std::collections::{BTreeSet, HashSet};
use tracing::info;

/// Drops every row whose id is in `outlier_ids`. The input is left untouched.
pub fn clean_data(table: &Table, outlier_ids: &BTreeSet<usize>) -> Table {
    info!(
        "Cleaning data by removing {} outlier rows.",
        outlier_ids.len()
    );
    let ids = table.row_ids();
    let cleaned = table.filter_rows(|pos| !outlier_ids.contains(&ids[pos]));
    info!("Cleaned data shape: {:?}", cleaned.shape());
    cleaned
}

/// Keeps the first occurrence of each row that is identical across all
/// columns, preserving the original order.
pub fn remove_duplicates(table: &Table) -> Table {
    let mut seen = HashSet::with_capacity(table.n_rows());
    let deduped = table.filter_rows(|pos| seen.insert(table.row_fingerprint(pos)));

    info!(
        "Removed {} duplicate rows. Shape: {:?} -> {:?}",
        table.n_rows() - deduped.n_rows(),
        table.shape(),
        deduped.shape()
    );
    deduped
}
