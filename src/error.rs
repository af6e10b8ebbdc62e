//! Error types for the credit score pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CreditScoreError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum CreditScoreError {
    #[error("Input file not found: {0}")]
    InputFileMissing(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Unknown class code: {0}")]
    UnknownClass(usize),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),
}

impl From<polars::error::PolarsError> for CreditScoreError {
    fn from(err: polars::error::PolarsError) -> Self {
        CreditScoreError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CreditScoreError {
    fn from(err: serde_json::Error) -> Self {
        CreditScoreError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for CreditScoreError {
    fn from(err: bincode::Error) -> Self {
        CreditScoreError::SerializationError(err.to_string())
    }
}

impl From<sqlx::Error> for CreditScoreError {
    fn from(err: sqlx::Error) -> Self {
        CreditScoreError::StorageError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CreditScoreError {
    fn from(err: ndarray::ShapeError) -> Self {
        CreditScoreError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
