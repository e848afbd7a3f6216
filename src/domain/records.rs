use super::errors::PipelineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Canonical input format for sentiment and price dates.
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";
/// Format used for document keys and price submissions.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Categorical price sentiment. Only "negative" is distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    NonNegative,
}

impl SentimentLabel {
    /// Exactly "negative" maps to [`SentimentLabel::Negative`]; anything else,
    /// including unknown or empty labels, is non-negative.
    pub fn from_label(label: &str) -> Self {
        if label == "negative" {
            Self::Negative
        } else {
            Self::NonNegative
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Negative => 0,
            Self::NonNegative => 1,
        }
    }
}

/// The six binary indicator flags of a news item, each 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Indicators {
    pub price_up: u8,
    pub price_constant: u8,
    pub price_down: u8,
    pub asset_comparison: u8,
    pub past_information: u8,
    pub future_information: u8,
}

impl Indicators {
    /// Builds flags from values in feature order, rejecting anything but 0 or 1.
    pub fn from_values(values: [i64; 6]) -> Result<Self, PipelineError> {
        let names = [
            "Price Direction Up",
            "Price Direction Constant",
            "Price Direction Down",
            "Asset Comparison",
            "Past Information",
            "Future Information",
        ];
        let mut flags = [0u8; 6];
        for (i, v) in values.iter().enumerate() {
            flags[i] = match v {
                0 => 0,
                1 => 1,
                other => {
                    return Err(PipelineError::validation(
                        names[i],
                        format!("expected 0 or 1, got {other}"),
                    ));
                }
            };
        }
        Ok(Self {
            price_up: flags[0],
            price_constant: flags[1],
            price_down: flags[2],
            asset_comparison: flags[3],
            past_information: flags[4],
            future_information: flags[5],
        })
    }

    /// Flags in feature order.
    pub fn as_array(&self) -> [u8; 6] {
        [
            self.price_up,
            self.price_constant,
            self.price_down,
            self.asset_comparison,
            self.past_information,
            self.future_information,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    pub news: String,
    pub indicators: Indicators,
    /// Label text as recorded, e.g. "positive", "negative", "neutral".
    pub price_sentiment: String,
}

impl SentimentRecord {
    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_label(&self.price_sentiment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub adj_close: f64,
}

/// One sentiment record joined with the price of the same date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    pub sentiment: SentimentRecord,
    pub adj_close: f64,
}

impl AlignedRecord {
    pub fn date(&self) -> NaiveDate {
        self.sentiment.date
    }
}

/// Unvalidated single-record input, as submitted through a form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: String,
    pub news: String,
    pub price_direction_up: String,
    pub price_direction_constant: String,
    pub price_direction_down: String,
    pub asset_comparison: String,
    pub past_information: String,
    pub future_information: String,
    pub price_sentiment: String,
}

impl RawRecord {
    /// Validates the raw fields. The date is tried under `date_format`
    /// first, then as ISO `YYYY-MM-DD`.
    pub fn parse(&self, date_format: &str) -> Result<SentimentRecord, PipelineError> {
        let raw_date = self.date.trim();
        let date = NaiveDate::parse_from_str(raw_date, date_format)
            .or_else(|_| NaiveDate::parse_from_str(raw_date, ISO_DATE_FORMAT))
            .map_err(|e| PipelineError::validation("Date", format!("'{raw_date}': {e}")))?;

        let fields = [
            ("Price Direction Up", &self.price_direction_up),
            ("Price Direction Constant", &self.price_direction_constant),
            ("Price Direction Down", &self.price_direction_down),
            ("Asset Comparison", &self.asset_comparison),
            ("Past Information", &self.past_information),
            ("Future Information", &self.future_information),
        ];
        let mut values = [0i64; 6];
        for (i, (name, raw)) in fields.iter().enumerate() {
            values[i] = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| PipelineError::validation(name, format!("'{raw}' is not an integer")))?;
        }

        Ok(SentimentRecord {
            date,
            news: self.news.clone(),
            indicators: Indicators::from_values(values)?,
            price_sentiment: self.price_sentiment.trim().to_string(),
        })
    }
}

/// Unvalidated single price submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub date: String,
    pub adj_close: String,
}

impl PriceEntry {
    /// Price submissions must use ISO `YYYY-MM-DD` and a finite number.
    pub fn parse(&self) -> Result<PriceRecord, PipelineError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), ISO_DATE_FORMAT)
            .map_err(|e| PipelineError::validation("Date", format!("'{}': {e}", self.date)))?;
        let adj_close = self
            .adj_close
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                PipelineError::validation(
                    "Adj Close",
                    format!("'{}' is not a number", self.adj_close),
                )
            })?;
        Ok(PriceRecord { date, adj_close })
    }
}

/// Records carrying the calendar date they are keyed by.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for SentimentRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for PriceRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Indexes records by date, keeping the first record seen for each date.
/// Also returns how many later records were discarded.
pub fn first_per_date<T: Dated>(records: &[T]) -> (BTreeMap<NaiveDate, &T>, usize) {
    let mut by_date = BTreeMap::new();
    let mut duplicates = 0;
    for record in records {
        match by_date.entry(record.date()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }
    (by_date, duplicates)
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negative => write!(f, "negative"),
            Self::NonNegative => write!(f, "non-negative"),
        }
    }
}
