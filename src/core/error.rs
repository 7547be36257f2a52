//! Error types for the SVM training pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Formulation error: {0}")]
    Formulation(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Model not trained")]
    NotTrained,

    #[error("Invalid label: expected -1 or +1, got {0}")]
    InvalidLabel(f64),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, SvmError>;
