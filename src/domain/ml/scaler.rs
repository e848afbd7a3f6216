use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Per-feature standardization: `(x - mean) / scale`.
///
/// Parameters are learned once from the training partition and then only
/// applied. A feature with zero variance gets a scale of 1.0, so it is
/// centred but not divided by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits on row-major samples. Returns `None` for an empty sample set.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let width = rows.first()?.len();
        let mut mean = Vec::with_capacity(width);
        let mut scale = Vec::with_capacity(width);

        for col in 0..width {
            let values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
            let m = values.iter().mean();
            let sd = values.iter().population_std_dev();
            mean.push(m);
            scale.push(if sd > 0.0 && sd.is_finite() { sd } else { 1.0 });
        }

        Some(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}
