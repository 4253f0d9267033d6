//! Worker error types.

use thiserror::Error;

use lockwall_client::ClientError;
use lockwall_media::MediaError;
use lockwall_models::{PrefsError, TimeParseError};
use lockwall_store::StoreError;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors from pipeline orchestration and scheduling.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid time of day: {0}")]
    Time(#[from] TimeParseError),

    #[error("Preferences invalid: {0}")]
    Prefs(#[from] PrefsError),

    #[error("Remote generation failed: {detail}")]
    RemoteJob { detail: String },

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn remote_job(detail: impl Into<String>) -> Self {
        Self::RemoteJob {
            detail: detail.into(),
        }
    }

    /// Check if a later pipeline attempt could plausibly succeed.
    ///
    /// Transport failures and the exhausted poll budget are transient; a
    /// remote `error` status, a structurally wrong download response, a
    /// failed or cancelled transform, and bad configuration are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::Client(e) => e.is_retryable(),
            WorkerError::Store(_) | WorkerError::Io(_) => true,
            WorkerError::Time(_)
            | WorkerError::Prefs(_)
            | WorkerError::RemoteJob { .. }
            | WorkerError::Media(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_classification() {
        assert!(WorkerError::Client(ClientError::PollTimeout { waited_ms: 1 }).is_retryable());
        assert!(!WorkerError::remote_job("backend says no").is_retryable());
        assert!(!WorkerError::Media(MediaError::Cancelled).is_retryable());
        assert!(
            !WorkerError::Client(ClientError::NotVideo {
                content_type: "application/json".into(),
                body: None,
            })
            .is_retryable()
        );
    }
}
