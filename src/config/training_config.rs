//! Training configuration parsing from environment variables.
//!
//! Forest size, seed, hold-out share and tree shape limits.

use crate::application::ml::trainer::TrainerConfig;
use anyhow::{Context, Result, bail};
use std::env;

/// Training environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingEnvConfig {
    pub n_trees: usize,
    pub random_seed: u64,
    pub test_fraction: f64,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        let trainer = TrainerConfig::default();
        Self {
            n_trees: trainer.n_trees,
            random_seed: trainer.seed,
            test_fraction: trainer.test_fraction,
            max_depth: trainer.max_depth,
            min_samples_split: trainer.min_samples_split,
        }
    }
}

impl TrainingEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let test_fraction = Self::parse_f64("TEST_FRACTION", defaults.test_fraction)?;
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            bail!("TEST_FRACTION must be between 0 and 1 (exclusive), got {test_fraction}");
        }

        let n_trees = Self::parse_usize("N_TREES", defaults.n_trees)?;
        if n_trees == 0 {
            bail!("N_TREES must be at least 1");
        }

        let max_depth = match env::var("MAX_DEPTH") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u16>()
                    .context("Failed to parse MAX_DEPTH")?,
            ),
            _ => None,
        };

        Ok(Self {
            n_trees,
            random_seed: Self::parse_u64("RANDOM_SEED", defaults.random_seed)?,
            test_fraction,
            max_depth,
            min_samples_split: Self::parse_usize("MIN_SAMPLES_SPLIT", defaults.min_samples_split)?,
        })
    }

    pub fn to_trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            n_trees: self.n_trees,
            seed: self.random_seed,
            test_fraction: self.test_fraction,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_u64(key: &str, default: u64) -> Result<u64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<u64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
