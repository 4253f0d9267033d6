//! Store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing the preferences file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Preferences file has no parent directory: {0}")]
    InvalidPath(PathBuf),

    #[error("Corrupt preferences file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}
