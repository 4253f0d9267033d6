//! Post-processing of downloaded assets into the canonical presentation form.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::command::{wait_cancelled, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// How the staged asset becomes the canonical asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostProcessMode {
    /// Byte copy; deployments that trust the downloaded encoding
    #[default]
    Copy,
    /// Strip audio and normalize to H.264
    Transcode,
}

impl PostProcessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostProcessMode::Copy => "copy",
            PostProcessMode::Transcode => "transcode",
        }
    }
}

impl FromStr for PostProcessMode {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "copy" => Ok(PostProcessMode::Copy),
            "transcode" => Ok(PostProcessMode::Transcode),
            other => Err(MediaError::UnknownMode(other.to_string())),
        }
    }
}

/// Transforms a staged asset into the canonical presentation asset.
///
/// Work happens on a temporary sibling of the output path; only a complete
/// result is renamed over `output`, so exactly one canonical asset exists
/// at any moment and a reader never sees a partial file. Cancellation is
/// propagated into the underlying operation (the FFmpeg child is killed,
/// not abandoned) and the call resolves exactly once.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    mode: PostProcessMode,
    timeout: Option<Duration>,
}

impl PostProcessor {
    /// Create a post-processor with the given mode.
    pub fn new(mode: PostProcessMode) -> Self {
        Self {
            mode,
            timeout: None,
        }
    }

    /// Bound the transform wall-clock time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn mode(&self) -> PostProcessMode {
        self.mode
    }

    /// Produce the canonical asset at `output` from the staged `input`.
    pub async fn process(
        &self,
        input: &Path,
        output: &Path,
        cancel: watch::Receiver<bool>,
    ) -> MediaResult<PathBuf> {
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let work = work_path_for(output);
        let result = match self.mode {
            PostProcessMode::Copy => self.copy_to(input, &work, cancel).await,
            PostProcessMode::Transcode => self.transcode_to(input, &work, cancel).await,
        };

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&work).await {
                debug!(work = %work.display(), error = %cleanup, "No partial output to remove");
            }
            return Err(e);
        }

        tokio::fs::rename(&work, output).await?;
        info!(
            output = %output.display(),
            mode = self.mode.as_str(),
            "Post-processed asset"
        );
        Ok(output.to_path_buf())
    }

    async fn copy_to(
        &self,
        input: &Path,
        work: &Path,
        cancel: watch::Receiver<bool>,
    ) -> MediaResult<()> {
        tokio::select! {
            biased;

            _ = wait_cancelled(Some(cancel)) => Err(MediaError::Cancelled),
            copied = tokio::fs::copy(input, work) => {
                copied?;
                Ok(())
            }
        }
    }

    async fn transcode_to(
        &self,
        input: &Path,
        work: &Path,
        cancel: watch::Receiver<bool>,
    ) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(input, work)
            .no_audio()
            .video_codec("libx264")
            .pixel_format("yuv420p")
            .preset("veryfast")
            .crf(23)
            .movflags("+faststart");

        let mut runner = FfmpegRunner::new().with_cancel(cancel);
        if let Some(timeout) = self.timeout {
            runner = runner.with_timeout(timeout);
        }
        runner.run(&cmd).await
    }
}

// Unique per run so a racing scheduled and manual invocation never share
// a work file; the rename still converges on the single canonical path.
fn work_path_for(output: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);

    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "asset".into());
    name.push(format!(".work.{}.{}", std::process::id(), seq));
    output.with_file_name(name)
}
