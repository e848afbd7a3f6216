use super::predictor::PricePredictor;
use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::ModelArtifact;
use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::records::{RawRecord, SentimentRecord};
use crate::infrastructure::artifact_store::ArtifactStore;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

enum Slot {
    Ready(Arc<ModelArtifact>),
    Unavailable(String),
}

/// Serves single-record predictions from a persisted artifact.
///
/// The artifact is loaded once at construction and shared read-only between
/// callers. [`InferenceAdapter::reload`] swaps in a newer artifact under the
/// write lock; in-flight predictions keep the `Arc` they already hold.
pub struct InferenceAdapter {
    store: ArtifactStore,
    date_format: String,
    slot: RwLock<Slot>,
}

impl InferenceAdapter {
    /// Loads the artifact from `store`. A failed load is not fatal: every
    /// prediction then reports the model as unavailable.
    pub fn new(store: ArtifactStore, date_format: impl Into<String>) -> Self {
        let slot = match store.load() {
            Ok(artifact) => Slot::Ready(Arc::new(artifact)),
            Err(e) => {
                warn!("Predictor starting without a model: {}", e);
                Slot::Unavailable(e.to_string())
            }
        };
        Self {
            store,
            date_format: date_format.into(),
            slot: RwLock::new(slot),
        }
    }

    /// Wraps an artifact that is already in memory.
    pub fn with_artifact(
        artifact: ModelArtifact,
        store: ArtifactStore,
        date_format: impl Into<String>,
    ) -> Self {
        Self {
            store,
            date_format: date_format.into(),
            slot: RwLock::new(Slot::Ready(Arc::new(artifact))),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.artifact().is_ok()
    }

    /// Re-reads the artifact from disk. On failure the current model stays in place.
    pub fn reload(&self) -> Result<(), PipelineError> {
        let artifact = self.store.load()?;
        let mut slot = self.slot.write().map_err(|_| self.poisoned())?;
        *slot = Slot::Ready(Arc::new(artifact));
        info!("Reloaded model from {:?}", self.store.path());
        Ok(())
    }

    fn poisoned(&self) -> PipelineError {
        PipelineError::ModelUnavailable {
            path: self.store.path().to_path_buf(),
            reason: "artifact lock poisoned".to_string(),
        }
    }

    fn artifact(&self) -> Result<Arc<ModelArtifact>, PipelineError> {
        let slot = self.slot.read().map_err(|_| self.poisoned())?;
        match &*slot {
            Slot::Ready(artifact) => Ok(Arc::clone(artifact)),
            Slot::Unavailable(reason) => Err(PipelineError::ModelUnavailable {
                path: self.store.path().to_path_buf(),
                reason: reason.clone(),
            }),
        }
    }

    /// Validates a raw submission and predicts its adjusted close.
    pub fn predict_raw(&self, raw: &RawRecord) -> Result<f64, PipelineError> {
        let artifact = self.artifact()?;
        let record = raw.parse(&self.date_format)?;
        predict_with(&artifact, &record)
    }

    /// Boundary entry point: always returns a message, never an error.
    pub fn respond(&self, raw: &RawRecord) -> String {
        match self.predict_raw(raw) {
            Ok(price) => format!("Predicted Adj Close: {:.2}", price),
            Err(e @ PipelineError::ModelUnavailable { .. }) => e.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }
}

fn predict_with(artifact: &ModelArtifact, record: &SentimentRecord) -> Result<f64, PipelineError> {
    let features = FeatureVector::from_record(record);
    artifact
        .predict(&[features])?
        .first()
        .copied()
        .ok_or_else(|| PipelineError::Prediction {
            reason: "no prediction returned".to_string(),
        })
}

impl PricePredictor for InferenceAdapter {
    fn predict(&self, record: &SentimentRecord) -> Result<f64, PipelineError> {
        let artifact = self.artifact()?;
        predict_with(&artifact, record)
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}
