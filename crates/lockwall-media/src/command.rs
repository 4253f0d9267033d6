//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Stderr lines retained for error reporting.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for FFmpeg invocations.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Strip all audio streams.
    pub fn no_audio(self) -> Self {
        self.output_arg("-an")
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set pixel format.
    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.output_arg("-pix_fmt").output_arg(format)
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set container flags.
    pub fn movflags(self, flags: impl Into<String>) -> Self {
        self.output_arg("-movflags").output_arg(flags)
    }

    /// Build the full argument list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());
        args
    }
}

/// Runner for FFmpeg commands with cancellation and timeout.
///
/// Resolves exactly once: either the child exits on its own, or the cancel
/// signal / timeout kills it and the corresponding error is returned. A
/// cancelled child is never left running.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    cancel_rx: Option<watch::Receiver<bool>>,
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set a wall-clock timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                let mut tail = Vec::new();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.remove(0);
                    }
                    tail.push(line);
                }
                tail
            })
        });

        let status = tokio::select! {
            biased;

            _ = wait_cancelled(self.cancel_rx.clone()) => {
                warn!("FFmpeg cancelled, killing process");
                child.kill().await.ok();
                return Err(MediaError::Cancelled);
            }
            _ = wait_deadline(self.timeout) => {
                let secs = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                child.kill().await.ok();
                return Err(MediaError::Timeout(secs));
            }
            status = child.wait() => status?,
        };

        if status.success() {
            return Ok(());
        }

        let stderr = match stderr_task {
            Some(task) => task.await.ok().map(|tail| tail.join("\n")),
            None => None,
        };
        Err(MediaError::ffmpeg_failed(
            "FFmpeg exited with non-zero status",
            stderr,
            status.code(),
        ))
    }
}

/// Resolves when the signal flips to cancelled; pends forever otherwise.
pub(crate) async fn wait_cancelled(cancel_rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel_rx else {
        return std::future::pending().await;
    };

    if *rx.borrow() {
        return;
    }
    loop {
        if rx.changed().await.is_err() {
            // Sender gone without cancelling; nothing can cancel us now.
            return std::future::pending().await;
        }
        if *rx.borrow() {
            return;
        }
    }
}

async fn wait_deadline(timeout: Option<Duration>) {
    match timeout {
        Some(timeout) => tokio::time::sleep(timeout).await,
        None => std::future::pending().await,
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_args_shape() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4")
            .no_audio()
            .video_codec("libx264")
            .pixel_format("yuv420p")
            .preset("veryfast")
            .crf(23)
            .movflags("+faststart");

        let args = cmd.build_args();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"-an".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"+faststart".to_string()));

        // Input before output args, output path last.
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        let an_pos = args.iter().position(|a| a == "-an").unwrap();
        assert!(i_pos < an_pos);
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[tokio::test]
    async fn test_wait_cancelled_observes_flip() {
        let (tx, rx) = watch::channel(false);

        let waiter = tokio::spawn(wait_cancelled(Some(rx)));
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_cancelled_already_set() {
        let (tx, rx) = watch::channel(true);
        wait_cancelled(Some(rx)).await;
        drop(tx);
    }
}
