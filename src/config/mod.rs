//! Configuration module for the news/price pipeline.
//!
//! Structured configuration loaded from environment variables, split into
//! data sources and training parameters. Binaries load `.env` first and let
//! command-line flags override individual values.

mod data_config;
mod training_config;

pub use data_config::DataEnvConfig;
pub use training_config::TrainingEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub data: DataEnvConfig,
    pub training: TrainingEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let data = DataEnvConfig::from_env();
        let training = TrainingEnvConfig::from_env().context("Failed to load training config")?;
        Ok(Self { data, training })
    }
}
