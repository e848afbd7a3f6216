// Tabular model and schemas
pub mod schema;
pub mod table;

// Typed records
pub mod records;

// Feature registry and scaler
pub mod ml;

// Document store traits
pub mod repositories;

// Domain-specific error types
pub mod errors;
