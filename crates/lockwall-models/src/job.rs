//! Generation job types for the remote video service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::prefs::UserPrefs;

/// Request body for a generation job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub subject: String,
    pub place: String,
    pub aspect: String,
    #[serde(rename = "durationSec")]
    pub duration_sec: u32,
}

impl GenerationRequest {
    /// Build a request from the current preferences.
    pub fn from_prefs(prefs: &UserPrefs) -> Self {
        Self {
            subject: prefs.cast.clone(),
            place: prefs.background.clone(),
            aspect: prefs.aspect.to_string(),
            duration_sec: prefs.duration_secs,
        }
    }
}

/// Remote job status.
///
/// The service reports status as a free-form string; `"ready"` and
/// `"error"` (case-insensitive) are terminal, anything else means the job
/// is still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, no status observed yet
    #[default]
    Pending,
    /// Remote reports the job is still in progress
    Running,
    /// Asset is ready for download
    Ready,
    /// Remote generation failed
    Error,
}

impl JobStatus {
    /// Map a remote status string onto the local enum.
    pub fn from_remote(status: &str) -> Self {
        if status.eq_ignore_ascii_case("ready") {
            JobStatus::Ready
        } else if status.eq_ignore_ascii_case("error") {
            JobStatus::Error
        } else {
            JobStatus::Running
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Ready => "ready",
            JobStatus::Error => "error",
        }
    }

    /// Check if this is a terminal state (no more transitions expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle for one remote generation job.
///
/// Created by submission, updated only by polling responses, and discarded
/// when the pipeline run completes. Never persisted across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(default, skip_serializing)]
    pub status: JobStatus,
    #[serde(default, skip_serializing)]
    pub detail: Option<String>,
}

impl GenerationJob {
    /// Record a status observation from a polling response.
    pub fn observe(mut self, status: JobStatus, detail: Option<String>) -> Self {
        self.status = status;
        self.detail = detail;
        self
    }
}
