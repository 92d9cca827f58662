//! Error types for the analytics engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for analytics operations
#[derive(Debug, Error)]
pub enum Error {
    /// Required column or grouping key absent from the input table
    #[error("Schema error: {0}")]
    Schema(String),

    /// Too few rows or distinct values for a statistical operation
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Invalid parameter (contamination range, cluster count, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Required-column failure for a named table
    pub fn missing_column(table: &str, column: &str) -> Self {
        Error::Schema(format!("column '{column}' not found in {table} table"))
    }
}
