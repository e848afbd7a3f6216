use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the cleaning, training and inference pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Required column '{column}' not found in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Not enough rows to train: need at least {needed}, got {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Training failed: {reason}")]
    Training { reason: String },

    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },

    #[error("Model could not be loaded from {path:?}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },

    #[error("Invalid input for '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("Failed to persist {what}: {reason}")]
    Persistence { what: String, reason: String },
}

impl PipelineError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_formatting() {
        let error = PipelineError::ModelUnavailable {
            path: PathBuf::from("models/missing.json"),
            reason: "file not found".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.starts_with("Model could not be loaded"));
        assert!(msg.contains("missing.json"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_validation_formatting() {
        let error = PipelineError::validation("Date", "expected DD-MM-YYYY");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'Date': expected DD-MM-YYYY"
        );
    }

    #[test]
    fn test_insufficient_data_formatting() {
        let error = PipelineError::InsufficientData {
            needed: 2,
            available: 1,
        };
        let msg = error.to_string();
        assert!(msg.contains("at least 2"));
        assert!(msg.contains("got 1"));
    }
}
