use crate::domain::errors::PipelineError;
use crate::domain::ml::artifact::ModelArtifact;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Location of the persisted {scaler, model} artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the artifact as JSON.
    ///
    /// Atomic write: write to temp file then rename, so concurrent readers
    /// see either the previous artifact or the new one, never a partial file.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<(), PipelineError> {
        let persist_err = |reason: String| PipelineError::Persistence {
            what: format!("model artifact {:?}", self.path),
            reason,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let file = File::create(&temp_path).map_err(|e| persist_err(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, artifact).map_err(|e| persist_err(e.to_string()))?;
        writer.flush().map_err(|e| persist_err(e.to_string()))?;
        drop(writer);
        fs::rename(&temp_path, &self.path).map_err(|e| persist_err(e.to_string()))?;

        info!("Model and scaler saved to {:?}", self.path);
        Ok(())
    }

    /// Reads the artifact back. Any failure, including a feature layout that
    /// differs from the current registry, is reported as `ModelUnavailable`.
    pub fn load(&self) -> Result<ModelArtifact, PipelineError> {
        let unavailable = |reason: String| {
            error!("Failed to load model from {:?}: {}", self.path, reason);
            PipelineError::ModelUnavailable {
                path: self.path.clone(),
                reason,
            }
        };

        let file = File::open(&self.path).map_err(|e| unavailable(e.to_string()))?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| unavailable(format!("deserialization failed: {}", e)))?;

        if !artifact.matches_registry() {
            return Err(unavailable(format!(
                "feature layout {:?} does not match this build",
                artifact.feature_names
            )));
        }

        info!(
            "Successfully loaded model from {:?} (trained {}, MAE {:.4})",
            self.path, artifact.metadata.trained_at, artifact.metadata.mae
        );
        Ok(artifact)
    }
}
