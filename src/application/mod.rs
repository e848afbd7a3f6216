pub mod data;
pub mod ml;
pub mod pipeline;
