use crate::domain::errors::PipelineError;
use crate::domain::table::Table;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Reads a comma-delimited file with a header row into a [`Table`].
pub fn load_table(path: &Path) -> Result<Table, PipelineError> {
    info!("Loading data from {:?}", path);
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = read_table(BufReader::new(file), path)?;
    let (rows, cols) = table.shape();
    info!("Data loaded. Shape: ({}, {})", rows, cols);
    Ok(table)
}

/// Parses delimited data from any reader. `origin` is only used in errors.
pub fn read_table<R: Read>(reader: R, origin: &Path) -> Result<Table, PipelineError> {
    let parse_err = |reason: String| PipelineError::Parse {
        path: origin.to_path_buf(),
        reason,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| parse_err(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(parse_err("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| parse_err(e.to_string()))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(Table::from_rows(&headers, &rows))
}
