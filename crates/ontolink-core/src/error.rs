//! Error types for ontolink.

use thiserror::Error;

/// Result type alias using ontolink's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ontolink operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input path or resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error (missing column, bad option)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Vector index construction, search, or persistence failed
    #[error("Index error: {0}")]
    Index(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Serialization(format!("CSV: {}", e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Index(format!("Index blob: {}", e))
    }
}
