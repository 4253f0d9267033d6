//! Asset download and staging.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use lockwall_models::{is_video_content_type, StagedAsset};

use crate::error::{ClientError, ClientResult};
use crate::generate::CONNECT_TIMEOUT;

/// Overall budget for a download request; sized for video bodies.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(900);

/// Bytes of a non-video body kept for diagnostics.
const MAX_DIAGNOSTIC_BYTES: usize = 2048;

/// Downloads generated assets into a staging directory.
///
/// The body streams into a `*.part` sibling and only a fully written file
/// is renamed to its final name, so consumers of the staging directory
/// never observe a half-written asset.
pub struct AssetFetcher {
    http: reqwest::Client,
    staging_dir: PathBuf,
}

impl AssetFetcher {
    /// Create a fetcher writing into `staging_dir` (created on demand).
    pub fn new(staging_dir: impl Into<PathBuf>) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            staging_dir: staging_dir.into(),
        })
    }

    /// Download `url` and stage it under `file_name`.
    ///
    /// - A non-2xx response is [`ClientError::DownloadStatus`].
    /// - A declared media type outside `video/*` is [`ClientError::NotVideo`],
    ///   carrying a bounded prefix of the body; this guards against a
    ///   backend returning a JSON error payload with HTTP 200.
    pub async fn fetch(&self, url: &str, file_name: &str) -> ClientResult<StagedAsset> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;

        let response = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::DownloadStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_video_content_type(&content_type) {
            let body = read_diagnostic_prefix(response).await;
            warn!(
                url = %url,
                content_type = %content_type,
                "Download response is not a video"
            );
            return Err(ClientError::not_video(content_type, body));
        }

        let final_path = self.staging_dir.join(file_name);
        let part_path = part_path_for(&final_path);

        match self.stream_to_file(response, &part_path).await {
            Ok(bytes_written) => {
                tokio::fs::rename(&part_path, &final_path).await?;
                info!(
                    path = %final_path.display(),
                    size_mb = bytes_written as f64 / 1_048_576.0,
                    content_type = %content_type,
                    "Staged downloaded asset"
                );
                Ok(StagedAsset {
                    local_path: final_path,
                    content_type,
                })
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part_path).await {
                    debug!(part = %part_path.display(), error = %cleanup, "No partial file to remove");
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        part_path: &Path,
    ) -> ClientResult<u64> {
        let mut file = tokio::fs::File::create(part_path).await?;
        let mut stream = response.bytes_stream();
        let mut bytes_written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(bytes_written)
    }
}

/// Unique per download so racing runs never share a partial file.
fn part_path_for(final_path: &Path) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);

    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "asset".into());
    name.push(format!(".part.{}.{}", std::process::id(), seq));
    final_path.with_file_name(name)
}

async fn read_diagnostic_prefix(response: reqwest::Response) -> Option<String> {
    let mut stream = response.bytes_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.ok()?;
        buf.extend_from_slice(&chunk);
        if buf.len() >= MAX_DIAGNOSTIC_BYTES {
            buf.truncate(MAX_DIAGNOSTIC_BYTES);
            break;
        }
    }

    if buf.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_download(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/dl/job-1"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_stages_video_body() {
        let server = MockServer::start().await;
        mount_download(
            &server,
            ResponseTemplate::new(200).set_body_raw(b"not really mp4 bytes".to_vec(), "video/mp4"),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let fetcher = AssetFetcher::new(dir.path()).unwrap();

        let asset = fetcher
            .fetch(&format!("{}/dl/job-1", server.uri()), "raw.mp4")
            .await
            .unwrap();

        assert_eq!(asset.content_type, "video/mp4");
        assert_eq!(asset.local_path, dir.path().join("raw.mp4"));
        let bytes = tokio::fs::read(&asset.local_path).await.unwrap();
        assert_eq!(bytes, b"not really mp4 bytes");
    }

    #[tokio::test]
    async fn test_fetch_leaves_no_partial_files() {
        let server = MockServer::start().await;
        mount_download(
            &server,
            ResponseTemplate::new(200).set_body_raw(vec![0u8; 64 * 1024], "video/mp4"),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let fetcher = AssetFetcher::new(dir.path()).unwrap();
        fetcher
            .fetch(&format!("{}/dl/job-1", server.uri()), "raw.mp4")
            .await
            .unwrap();

        let mut entries = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect::<Vec<_>>();
        entries.sort();
        assert_eq!(entries, vec!["raw.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_json_with_200() {
        let server = MockServer::start().await;
        mount_download(
            &server,
            ResponseTemplate::new(200)
                .set_body_raw(br#"{"error": "quota exhausted"}"#.to_vec(), "application/json"),
        )
        .await;

        let dir = TempDir::new().unwrap();
        let fetcher = AssetFetcher::new(dir.path()).unwrap();
        let err = fetcher
            .fetch(&format!("{}/dl/job-1", server.uri()), "raw.mp4")
            .await
            .unwrap_err();

        assert!(!err.is_retryable(), "content-type mismatch must not be retryable");
        match err {
            ClientError::NotVideo { content_type, body } => {
                assert_eq!(content_type, "application/json");
                assert!(body.unwrap().contains("quota exhausted"));
            }
            other => panic!("expected NotVideo, got {:?}", other),
        }

        // Nothing visible under the final name.
        assert!(!dir.path().join("raw.mp4").exists());
    }

    #[tokio::test]
    async fn test_fetch_propagates_http_status() {
        let server = MockServer::start().await;
        mount_download(&server, ResponseTemplate::new(404)).await;

        let dir = TempDir::new().unwrap();
        let fetcher = AssetFetcher::new(dir.path()).unwrap();
        let err = fetcher
            .fetch(&format!("{}/dl/job-1", server.uri()), "raw.mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::DownloadStatus { status: 404 }));
        assert!(!err.is_retryable());
    }
}
