use super::feature_registry::{FEATURE_NAMES, FeatureVector};
use super::scaler::StandardScaler;
use crate::domain::errors::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

pub type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub n_trees: usize,
    pub seed: u64,
    pub n_train: usize,
    pub n_test: usize,
    /// Held-out mean absolute error, in target units.
    pub mae: f64,
    pub trained_at: DateTime<Utc>,
}

/// A fitted model together with the scaler it was trained behind.
///
/// The two are only ever created, persisted and loaded as one unit.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub model: ForestModel,
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    /// True when the artifact was trained on the current feature layout.
    pub fn matches_registry(&self) -> bool {
        self.feature_names.len() == FEATURE_NAMES.len()
            && self
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .all(|(a, b)| a == b)
            && self.scaler.n_features() == FEATURE_NAMES.len()
    }

    /// Scales each vector with the stored scaler and evaluates the model.
    pub fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>, PipelineError> {
        let scaled: Vec<Vec<f64>> = features
            .iter()
            .map(|fv| self.scaler.transform_row(fv.as_slice()))
            .collect();
        predict_scaled(&self.model, &scaled)
    }
}

/// Evaluates the forest on rows that are already scaled.
pub fn predict_scaled(model: &ForestModel, rows: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
    let matrix = DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| PipelineError::Prediction {
        reason: format!("matrix creation failed: {}", e),
    })?;
    model.predict(&matrix).map_err(|e| PipelineError::Prediction {
        reason: e.to_string(),
    })
}
