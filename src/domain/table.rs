//! In-memory tabular model.
//!
//! A [`Table`] is an ordered set of named, typed columns plus a stable row id
//! per row. Row ids are assigned at load time and survive filtering, so the
//! outlier set produced by quality inspection can be applied to any table
//! derived from the same source.

use chrono::NaiveDate;
use std::fmt;

/// Logical type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Text,
    Integer,
    Float,
    Date,
}

impl LogicalType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "int64"),
            Self::Float => write!(f, "float64"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    /// Raw text that did not parse under the expected date format.
    UnparseableDate(String),
}

impl Value {
    /// Absent cells and dates that failed to parse.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Null | Self::UnparseableDate(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::UnparseableDate(s) => Some(s),
            _ => None,
        }
    }

    /// Identity used for exact-duplicate detection (floats compared bitwise).
    fn fingerprint(&self) -> String {
        match self {
            Self::Null => "n".to_string(),
            Self::Int(v) => format!("i{v}"),
            Self::Float(v) => format!("f{}", v.to_bits()),
            Self::Text(s) => format!("t{s}"),
            Self::Date(d) => format!("d{d}"),
            Self::UnparseableDate(s) => format!("u{s}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) | Self::UnparseableDate(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{d}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: LogicalType,
    pub values: Vec<Value>,
}

impl Column {
    /// Builds a column from raw cells, inferring the narrowest type that
    /// fits every non-empty cell: integer, then float, then text.
    pub fn infer(name: impl Into<String>, raw: &[&str]) -> Self {
        let present: Vec<&str> = raw.iter().copied().filter(|s| !s.is_empty()).collect();

        let dtype = if !present.is_empty() && present.iter().all(|s| s.parse::<i64>().is_ok()) {
            LogicalType::Integer
        } else if present.iter().all(|s| s.parse::<f64>().is_ok()) {
            // An all-empty column lands here as well, like a NaN-only float column.
            LogicalType::Float
        } else {
            LogicalType::Text
        };

        let values = raw
            .iter()
            .map(|s| {
                if s.is_empty() {
                    return Value::Null;
                }
                match dtype {
                    LogicalType::Integer => s.parse().map(Value::Int).unwrap_or(Value::Null),
                    LogicalType::Float => s.parse().map(Value::Float).unwrap_or(Value::Null),
                    _ => Value::Text(s.to_string()),
                }
            })
            .collect();

        Self {
            name: name.into(),
            dtype,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_ids: Vec<usize>,
}

impl Table {
    /// Builds a table from a header and string rows. Short rows are padded with nulls.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let raw: Vec<&str> = rows
                    .iter()
                    .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                    .collect();
                Column::infer(name.as_ref(), &raw)
            })
            .collect();

        Self {
            columns,
            row_ids: (0..rows.len()).collect(),
        }
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.columns.len())
    }

    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_ids(&self) -> &[usize] {
        &self.row_ids
    }

    /// Position of the first column whose name matches any of `names`.
    pub fn column_index(&self, names: &[&str]) -> Option<usize> {
        names
            .iter()
            .find_map(|n| self.columns.iter().position(|c| c.name == *n))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(&[name]).map(|idx| &self.columns[idx])
    }

    /// Cell at row position `row` (not row id) in column `col`.
    pub fn value(&self, row: usize, col: usize) -> &Value {
        &self.columns[col].values[row]
    }

    /// Fingerprint of the full row at position `row`.
    pub(crate) fn row_fingerprint(&self, row: usize) -> String {
        self.columns
            .iter()
            .map(|c| c.values[row].fingerprint())
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }

    /// New table holding the rows (by position) for which `keep` returns true.
    pub(crate) fn filter_rows(&self, mut keep: impl FnMut(usize) -> bool) -> Table {
        let positions: Vec<usize> = (0..self.n_rows()).filter(|&p| keep(p)).collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: positions.iter().map(|&p| c.values[p].clone()).collect(),
            })
            .collect();

        Table {
            columns,
            row_ids: positions.iter().map(|&p| self.row_ids[p]).collect(),
        }
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> &mut Column {
        &mut self.columns[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_type_inference() {
        let table = Table::from_rows(
            &["count", "price", "label", "empty"],
            &rows(&[&["1", "1.5", "up", ""], &["2", "2", "down", ""]]),
        );

        let types: Vec<LogicalType> = table.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            types,
            vec![
                LogicalType::Integer,
                LogicalType::Float,
                LogicalType::Text,
                LogicalType::Float
            ]
        );
        assert_eq!(table.shape(), (2, 4));
        assert_eq!(table.value(1, 1), &Value::Float(2.0));
    }

    #[test]
    fn test_short_rows_padded_with_null() {
        let table = Table::from_rows(&["a", "b"], &rows(&[&["1"], &["2", "3"]]));
        assert_eq!(table.value(0, 1), &Value::Null);
        assert_eq!(table.columns()[1].dtype, LogicalType::Integer);
    }

    #[test]
    fn test_filter_keeps_row_ids() {
        let table = Table::from_rows(&["a"], &rows(&[&["10"], &["20"], &["30"]]));
        let filtered = table.filter_rows(|p| p != 1);
        assert_eq!(filtered.row_ids(), &[0, 2]);
        assert_eq!(filtered.value(1, 0), &Value::Int(30));
    }

    #[test]
    fn test_column_lookup_by_alias() {
        let table = Table::from_rows(&["Dates", "News"], &rows(&[&["01-01-2024", "x"]]));
        assert_eq!(table.column_index(&["Date", "Dates"]), Some(0));
        assert!(table.column("Date").is_none());
    }
}
