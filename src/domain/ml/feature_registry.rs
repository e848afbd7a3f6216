use crate::domain::records::SentimentRecord;
use chrono::{Datelike, NaiveDate};

/// Ordered list of feature names.
/// This order is part of the persisted model contract: training and inference
/// both go through [`FeatureVector::from_record`], and artifacts record these
/// names so a reordered build refuses to load an older model.
pub const FEATURE_NAMES: &[&str] = &[
    "year",
    "month",
    "day",
    "day_of_week",
    "week_of_year",
    "price_direction_up",
    "price_direction_constant",
    "price_direction_down",
    "asset_comparison",
    "past_information",
    "future_information",
    "price_sentiment",
];

pub const FEATURE_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

/// Calendar features of a date: year, month, day, day of week (Monday = 0)
/// and ISO-8601 week number.
pub fn calendar_features(date: NaiveDate) -> [f64; 5] {
    [
        date.year() as f64,
        date.month() as f64,
        date.day() as f64,
        date.weekday().num_days_from_monday() as f64,
        date.iso_week().week() as f64,
    ]
}

impl FeatureVector {
    pub fn from_record(record: &SentimentRecord) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[..5].copy_from_slice(&calendar_features(record.date));
        for (slot, flag) in values[5..11]
            .iter_mut()
            .zip(record.indicators.as_array())
        {
            *slot = flag as f64;
        }
        values[11] = record.label().code() as f64;
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }
}
