use crate::domain::errors::PipelineError;
use crate::domain::records::SentimentRecord;

/// Interface for adjusted-close price models
pub trait PricePredictor: Send + Sync {
    /// Predict the adjusted close for one validated record
    fn predict(&self, record: &SentimentRecord) -> Result<f64, PipelineError>;

    /// Get model name/type
    fn name(&self) -> &str;
}
