//! Data source configuration parsing from environment variables.
//!
//! Input file locations, their date formats and the model artifact path.

use crate::domain::records::DEFAULT_DATE_FORMAT;
use std::env;
use std::path::PathBuf;

/// Data environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DataEnvConfig {
    pub sentiment_path: PathBuf,
    pub price_path: PathBuf,
    pub model_path: PathBuf,
    pub sentiment_date_format: String,
    pub price_date_format: String,
}

impl Default for DataEnvConfig {
    fn default() -> Self {
        Self {
            sentiment_path: PathBuf::from("data/sentiment_data.csv"),
            price_path: PathBuf::from("data/price_data.csv"),
            model_path: PathBuf::from("models/random_forest_model.json"),
            sentiment_date_format: DEFAULT_DATE_FORMAT.to_string(),
            price_date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DataEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sentiment_path: Self::path_var("SENTIMENT_DATA_PATH", defaults.sentiment_path),
            price_path: Self::path_var("PRICE_DATA_PATH", defaults.price_path),
            model_path: Self::path_var("MODEL_PATH", defaults.model_path),
            sentiment_date_format: env::var("SENTIMENT_DATE_FORMAT")
                .unwrap_or(defaults.sentiment_date_format),
            price_date_format: env::var("PRICE_DATE_FORMAT").unwrap_or(defaults.price_date_format),
        }
    }

    fn path_var(key: &str, default: PathBuf) -> PathBuf {
        env::var(key).map(PathBuf::from).unwrap_or(default)
    }
}
