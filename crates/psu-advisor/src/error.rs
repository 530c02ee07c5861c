//! Error Types for the PSU Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Dataset-layer errors. Domain-level lookup misses (unknown PSU, unknown
/// sector, invalid metric) are NOT errors here: the analytics toolkit
/// reports them as `{"error": ...}` payloads that flow back to the model.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Dataset contains no records")]
    EmptyDataset,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
