//! Error types for FreshQuery.
//!
//! This module defines a unified error enum covering every failure category of
//! the answering pipeline: configuration, I/O, search, crawling, embedding,
//! indexing, generation and prompt rendering.

use thiserror::Error;

/// Unified error type for FreshQuery.
///
/// Library functions return `Result<T, AppError>`. The pipeline entry point
/// converts these into degraded answers instead of surfacing them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search backend errors (unreachable, bad status, unparsable body)
    #[error("Search error: {0}")]
    Search(String),

    /// Page fetch and extraction errors
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Embedding backend errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Similarity index errors
    #[error("Index error: {0}")]
    Index(String),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
