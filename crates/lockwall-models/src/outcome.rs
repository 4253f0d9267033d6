//! Final classification of a pipeline invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The one value a pipeline run reports back to its trigger.
///
/// Every stage-level error folds into exactly one of these cases; nothing
/// escapes the runner in raw form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The run produced a new asset at this path
    Completed { asset_path: PathBuf },
    /// The run failed transiently; a later attempt may succeed
    Retryable { reason: String },
    /// The run failed permanently; retrying the same input will not help
    Failed { reason: String },
}

impl PipelineOutcome {
    pub fn completed(asset_path: impl Into<PathBuf>) -> Self {
        Self::Completed {
            asset_path: asset_path.into(),
        }
    }

    pub fn retryable(reason: impl Into<String>) -> Self {
        Self::Retryable {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineOutcome::Retryable { .. })
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineOutcome::Completed { asset_path } => {
                write!(f, "completed: {}", asset_path.display())
            }
            PipelineOutcome::Retryable { reason } => write!(f, "retryable: {}", reason),
            PipelineOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
