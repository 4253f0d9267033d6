//! Job submission and status polling.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use lockwall_models::{GenerationJob, GenerationRequest, JobStatus};

use crate::error::{ClientError, ClientResult};

/// TCP connect budget for every request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall budget for the small control requests (submit, status).
const CONTROL_TIMEOUT: Duration = Duration::from_secs(30);

/// Polling cadence and cumulative wall-clock budget.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between consecutive status polls
    pub interval: Duration,
    /// Cumulative wait after which polling gives up
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Status response from the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Client for the remote generation service.
pub struct GenerateClient {
    base_url: String,
    http: reqwest::Client,
}

impl GenerateClient {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &Url) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Submit a generation job.
    ///
    /// Returns the job handle with its eventual download URL. Submission
    /// does not imply readiness; the job starts in [`JobStatus::Pending`].
    pub async fn submit(&self, request: &GenerationRequest) -> ClientResult<GenerationJob> {
        let url = format!("{}/generateVideo", self.base_url);
        debug!(subject = %request.subject, aspect = %request.aspect, "Submitting generation job");

        let response = self
            .http
            .post(&url)
            .timeout(CONTROL_TIMEOUT)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::unexpected_status(
                response.status().as_u16(),
                "submit",
            ));
        }

        let job: GenerationJob = response.json().await?;
        info!(job_id = %job.job_id, "Generation job submitted");
        Ok(job)
    }

    /// Fetch the current remote status of a job.
    pub async fn fetch_status(&self, job_id: &str) -> ClientResult<StatusResponse> {
        let url = format!("{}/status/{}", self.base_url, job_id);

        let response = self.http.get(&url).timeout(CONTROL_TIMEOUT).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::unexpected_status(
                response.status().as_u16(),
                "status",
            ));
        }

        Ok(response.json().await?)
    }

    /// Poll a job until it reaches a terminal status.
    ///
    /// Polls are strictly sequential at `poll.interval` until the remote
    /// reports `ready` or `error`, both of which are returned as the
    /// terminal job. Once the accumulated wait exceeds `poll.max_wait`
    /// without a terminal status the loop gives up with
    /// [`ClientError::PollTimeout`]; the remote job may still be working,
    /// so the caller decides what that means.
    pub async fn poll_until_terminal(
        &self,
        job: &GenerationJob,
        poll: &PollConfig,
    ) -> ClientResult<GenerationJob> {
        let mut waited = Duration::ZERO;

        loop {
            let remote = self.fetch_status(&job.job_id).await?;
            let status = JobStatus::from_remote(&remote.status);
            debug!(
                job_id = %job.job_id,
                status = %status,
                detail = remote.detail.as_deref().unwrap_or(""),
                waited_ms = waited.as_millis() as u64,
                "Polled job status"
            );

            if status.is_terminal() {
                return Ok(job.clone().observe(status, remote.detail));
            }

            if waited >= poll.max_wait {
                return Err(ClientError::PollTimeout {
                    waited_ms: waited.as_millis() as u64,
                });
            }

            tokio::time::sleep(poll.interval).await;
            waited += poll.interval;
        }
    }
}
