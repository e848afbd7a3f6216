// Training and inference
pub mod inference;
pub mod predictor;
pub mod trainer;
