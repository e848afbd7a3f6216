//! Expected layouts of the sentiment and price tables.
//!
//! A schema is an ordered list of column specs. The same spec drives type
//! checking and record extraction, so column spellings seen in the source
//! data are declared once, as aliases.

use super::table::{LogicalType, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Canonical column name (also the document field name).
    pub name: &'static str,
    /// Alternative spellings found in source files.
    pub aliases: &'static [&'static str],
    pub dtype: LogicalType,
    pub required: bool,
}

impl ColumnSpec {
    const fn new(name: &'static str, dtype: LogicalType) -> Self {
        Self {
            name,
            aliases: &[],
            dtype,
            required: true,
        }
    }

    const fn aka(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Canonical name followed by aliases, in lookup order.
    pub fn names(&self) -> Vec<&'static str> {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .collect()
    }

    /// Position of this column in `table`, if present under any spelling.
    pub fn locate(&self, table: &Table) -> Option<usize> {
        table.column_index(&self.names())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl Schema {
    pub fn spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub const SENTIMENT_DATE: ColumnSpec = ColumnSpec::new("Date", LogicalType::Date).aka(&["Dates"]);
pub const NEWS: ColumnSpec = ColumnSpec::new("News", LogicalType::Text).optional();
pub const PRICE_DIRECTION_UP: ColumnSpec =
    ColumnSpec::new("Price Direction Up", LogicalType::Integer);
pub const PRICE_DIRECTION_CONSTANT: ColumnSpec =
    ColumnSpec::new("Price Direction Constant", LogicalType::Integer);
pub const PRICE_DIRECTION_DOWN: ColumnSpec =
    ColumnSpec::new("Price Direction Down", LogicalType::Integer);
pub const ASSET_COMPARISON: ColumnSpec =
    ColumnSpec::new("Asset Comparison", LogicalType::Integer).aka(&["Asset Comparision"]);
pub const PAST_INFORMATION: ColumnSpec = ColumnSpec::new("Past Information", LogicalType::Integer);
pub const FUTURE_INFORMATION: ColumnSpec =
    ColumnSpec::new("Future Information", LogicalType::Integer);
pub const PRICE_SENTIMENT: ColumnSpec = ColumnSpec::new("Price Sentiment", LogicalType::Text);

/// Indicator flags in feature order.
pub const INDICATOR_COLUMNS: [ColumnSpec; 6] = [
    PRICE_DIRECTION_UP,
    PRICE_DIRECTION_CONSTANT,
    PRICE_DIRECTION_DOWN,
    ASSET_COMPARISON,
    PAST_INFORMATION,
    FUTURE_INFORMATION,
];

pub const SENTIMENT_SCHEMA: Schema = Schema {
    name: "sentiment",
    columns: &[
        SENTIMENT_DATE,
        NEWS,
        PRICE_DIRECTION_UP,
        PRICE_DIRECTION_CONSTANT,
        PRICE_DIRECTION_DOWN,
        ASSET_COMPARISON,
        PAST_INFORMATION,
        FUTURE_INFORMATION,
        PRICE_SENTIMENT,
    ],
};

pub const PRICE_DATE: ColumnSpec = ColumnSpec::new("Date", LogicalType::Date).aka(&["date"]);
pub const ADJ_CLOSE: ColumnSpec =
    ColumnSpec::new("Adj Close", LogicalType::Float).aka(&["Adjusted Close", "adj_close"]);

pub const PRICE_SCHEMA: Schema = Schema {
    name: "price",
    columns: &[
        PRICE_DATE,
        ColumnSpec::new("Open", LogicalType::Float).optional(),
        ColumnSpec::new("High", LogicalType::Float).optional(),
        ColumnSpec::new("Low", LogicalType::Float).optional(),
        ColumnSpec::new("Close", LogicalType::Float).optional(),
        ADJ_CLOSE,
    ],
};
