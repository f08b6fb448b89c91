//! Error types for the interaction service.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("llm request failed: {0}")]
    Llm(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("invalid record: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
