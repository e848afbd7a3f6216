//! Train/test split, standardization and random forest fitting.

use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::{ArtifactMetadata, ForestModel, ModelArtifact, predict_scaled};
use crate::domain::ml::feature_registry::{FEATURE_NAMES, FeatureVector};
use crate::domain::ml::scaler::StandardScaler;
use crate::domain::records::AlignedRecord;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Seed shared by the split shuffle and the forest
    pub seed: u64,
    /// Share of rows held out for evaluation, in (0, 1)
    pub test_fraction: f64,
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub mae: f64,
    pub n_train: usize,
    pub n_test: usize,
}

/// Shuffled split of row positions into (train, test).
///
/// The test side gets `ceil(n * test_fraction)` rows; both sides are kept
/// non-empty, so at least two rows are needed.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::Training {
            reason: format!("test fraction must be in (0, 1), got {}", test_fraction),
        });
    }
    if n < 2 {
        return Err(PipelineError::InsufficientData {
            needed: 2,
            available: n,
        });
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);

    let mut positions: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    positions.shuffle(&mut rng);

    let test = positions[..n_test].to_vec();
    let train = positions[n_test..].to_vec();
    Ok((train, test))
}

pub fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    predictions
        .iter()
        .zip(actuals)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / predictions.len() as f64
}

fn fit_forest(
    x: &[Vec<f64>],
    y: &[f64],
    config: &TrainerConfig,
) -> Result<ForestModel, PipelineError> {
    let matrix = DenseMatrix::from_2d_vec(&x.to_vec()).map_err(|e| PipelineError::Training {
        reason: format!("Matrix error: {}", e),
    })?;

    let mut params = RandomForestRegressorParameters::default()
        .with_n_trees(config.n_trees)
        .with_min_samples_split(config.min_samples_split)
        .with_seed(config.seed);
    if let Some(depth) = config.max_depth {
        params = params.with_max_depth(depth);
    }

    RandomForestRegressor::fit(&matrix, &y.to_vec(), params).map_err(|e| {
        PipelineError::Training {
            reason: e.to_string(),
        }
    })
}

/// Fits scaler and forest on a seeded 80/20 style split of `records` and
/// reports the held-out mean absolute error on adjusted close.
pub fn train(
    records: &[AlignedRecord],
    config: &TrainerConfig,
) -> Result<TrainingOutcome, PipelineError> {
    let features: Vec<Vec<f64>> = records
        .iter()
        .map(|r| FeatureVector::from_record(&r.sentiment).to_vec())
        .collect();
    let targets: Vec<f64> = records.iter().map(|r| r.adj_close).collect();

    let (train_idx, test_idx) = train_test_split(records.len(), config.test_fraction, config.seed)?;
    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            idx.iter().map(|&i| features[i].clone()).collect(),
            idx.iter().map(|&i| targets[i]).collect(),
        )
    };
    let (x_train, y_train) = pick(&train_idx);
    let (x_test, y_test) = pick(&test_idx);
    info!(
        "Split {} rows: {} train, {} test (seed {})",
        records.len(),
        x_train.len(),
        x_test.len(),
        config.seed
    );

    let scaler = StandardScaler::fit(&x_train).ok_or(PipelineError::InsufficientData {
        needed: 1,
        available: 0,
    })?;
    let x_train_scaled = scaler.transform(&x_train);
    let x_test_scaled = scaler.transform(&x_test);

    info!(
        "Training Random Forest Regressor (Trees: {}, Depth: {:?}, MinSplit: {})...",
        config.n_trees, config.max_depth, config.min_samples_split
    );
    let model = fit_forest(&x_train_scaled, &y_train, config)?;

    let predictions = predict_scaled(&model, &x_test_scaled)?;
    let mae = mean_absolute_error(&predictions, &y_test);
    info!("Mean Absolute Error: {:.6} (n={})", mae, y_test.len());

    let artifact = ModelArtifact {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        scaler,
        model,
        metadata: ArtifactMetadata {
            n_trees: config.n_trees,
            seed: config.seed,
            n_train: x_train.len(),
            n_test: x_test.len(),
            mae,
            trained_at: Utc::now(),
        },
    };

    Ok(TrainingOutcome {
        artifact,
        mae,
        n_train: x_train.len(),
        n_test: x_test.len(),
    })
}
