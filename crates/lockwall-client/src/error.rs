//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the generation service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service returned HTTP {status} on {operation}")]
    UnexpectedStatus { status: u16, operation: &'static str },

    #[error("No terminal job status after {waited_ms} ms")]
    PollTimeout { waited_ms: u64 },

    #[error("Download failed with HTTP {status}")]
    DownloadStatus { status: u16 },

    #[error("Expected a video payload, got Content-Type {content_type:?}")]
    NotVideo {
        content_type: String,
        /// Bounded prefix of the (likely textual) body, for diagnostics
        body: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn unexpected_status(status: u16, operation: &'static str) -> Self {
        Self::UnexpectedStatus { status, operation }
    }

    pub fn not_video(content_type: impl Into<String>, body: Option<String>) -> Self {
        Self::NotVideo {
            content_type: content_type.into(),
            body,
        }
    }

    /// Check if a later attempt could plausibly succeed.
    ///
    /// Transport-level failures and an exhausted poll budget are transient;
    /// a structurally wrong response (bad download status, non-video body)
    /// will not change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_)
                | ClientError::Io(_)
                | ClientError::PollTimeout { .. }
                | ClientError::UnexpectedStatus { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_classification() {
        assert!(ClientError::PollTimeout { waited_ms: 600_000 }.is_retryable());
        assert!(ClientError::unexpected_status(503, "submit").is_retryable());
        assert!(!ClientError::DownloadStatus { status: 404 }.is_retryable());
        assert!(!ClientError::not_video("application/json", None).is_retryable());
    }
}
