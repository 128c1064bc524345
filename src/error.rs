// src/error.rs

use thiserror::Error;

/// Errors from the storage and content edges. The practice core itself never fails.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid content: {0}")]
    InvalidContent(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
