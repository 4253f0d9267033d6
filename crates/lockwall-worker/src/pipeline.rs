//! The generation pipeline and its outcome classification.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use lockwall_client::{AssetFetcher, GenerateClient};
use lockwall_media::PostProcessor;
use lockwall_models::{GenerationRequest, JobStatus, PipelineOutcome};
use lockwall_store::PrefsStore;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::notify::Notifier;

/// Name the staged download lands under before post-processing.
const RAW_ASSET_NAME: &str = "lockscreen_raw.mp4";

/// Everything one pipeline invocation needs.
///
/// Shared between the recurring trigger and manual runs; the two are not
/// mutually exclusive. Each invocation reads the preferences fresh and the
/// store's atomic replace keeps the racing writes internally consistent,
/// last writer winning on the latest-asset slot.
pub struct PipelineContext {
    pub config: WorkerConfig,
    pub store: PrefsStore,
    pub client: GenerateClient,
    pub fetcher: AssetFetcher,
    pub processor: PostProcessor,
    pub notifier: Arc<dyn Notifier>,
}

impl PipelineContext {
    /// Wire up a context from configuration.
    pub fn new(config: WorkerConfig, notifier: Arc<dyn Notifier>) -> WorkerResult<Self> {
        let store = PrefsStore::new(config.prefs_path());
        let client = GenerateClient::new(&config.base_url)?;
        let fetcher = AssetFetcher::new(config.staging_dir())?;
        let processor =
            PostProcessor::new(config.post_process).with_timeout(config.transform_timeout);

        Ok(Self {
            config,
            store,
            client,
            fetcher,
            processor,
            notifier,
        })
    }
}

/// Run the full generation pipeline once.
///
/// Submitting → Polling → Downloading → Processing, strictly sequential,
/// each stage suspending without blocking. Every stage error is caught
/// here and folded into exactly one [`PipelineOutcome`]; nothing escapes
/// to the trigger in raw form. `cancel` propagates into whichever
/// suspension point is active, including the native transform.
pub async fn run_generate(
    ctx: &PipelineContext,
    cancel: watch::Receiver<bool>,
) -> PipelineOutcome {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, "Starting generation pipeline");

    let outcome = match generate_stages(ctx, cancel).await {
        Ok(asset_path) => PipelineOutcome::Completed { asset_path },
        Err(e) => classify(e),
    };

    match &outcome {
        PipelineOutcome::Completed { asset_path } => {
            info!(run_id = %run_id, asset_path = %asset_path.display(), "Pipeline completed");
        }
        PipelineOutcome::Retryable { reason } => {
            warn!(run_id = %run_id, reason = %reason, "Pipeline failed, will retry");
        }
        PipelineOutcome::Failed { reason } => {
            error!(run_id = %run_id, reason = %reason, "Pipeline failed permanently");
        }
    }
    outcome
}

async fn generate_stages(
    ctx: &PipelineContext,
    cancel: watch::Receiver<bool>,
) -> WorkerResult<std::path::PathBuf> {
    // Idle → Submitting: configuration is read fresh, never cached from a
    // previous run.
    let prefs = ctx.store.load().await?;
    prefs.validate()?;
    let request = GenerationRequest::from_prefs(&prefs);

    let job = ctx.client.submit(&request).await?;

    // Submitting → Polling
    let job = ctx
        .client
        .poll_until_terminal(&job, &ctx.config.poll())
        .await?;

    // Polling → PermanentlyFailed on a terminal remote error; the backend
    // will not change its mind about this job.
    if job.status == JobStatus::Error {
        return Err(WorkerError::remote_job(
            job.detail.unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    // Polling → Downloading
    let staged = ctx.fetcher.fetch(&job.download_url, RAW_ASSET_NAME).await?;

    // Downloading → Processing
    let output = ctx.config.output_path();
    let asset_path = ctx
        .processor
        .process(&staged.local_path, &output, cancel)
        .await?;

    // Processing → Done: the single store mutation of the run.
    ctx.store.set_latest_video(&asset_path).await?;

    Ok(asset_path)
}

fn classify(e: WorkerError) -> PipelineOutcome {
    if e.is_retryable() {
        PipelineOutcome::retryable(e.to_string())
    } else {
        PipelineOutcome::failed(e.to_string())
    }
}

/// Run the apply stage once: surface the latest asset to the user.
///
/// No-op when no run has completed yet. The notifier owns everything past
/// the alert (the platform cannot apply a renderer without the user).
pub async fn run_apply(ctx: &PipelineContext) -> WorkerResult<()> {
    match ctx.store.latest_video().await? {
        Some(path) => {
            ctx.notifier.notify_apply_ready(&path);
            Ok(())
        }
        None => {
            info!("No asset produced yet, skipping apply notification");
            Ok(())
        }
    }
}
