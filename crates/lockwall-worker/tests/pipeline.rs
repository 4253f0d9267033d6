//! End-to-end pipeline tests against a mocked generation service.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use lockwall_models::PipelineOutcome;
use lockwall_worker::{run_apply, run_generate, Notifier, PipelineContext, WorkerConfig};

/// Responds with each template in turn, repeating the last one.
struct StatusSequence {
    responses: Vec<ResponseTemplate>,
    next: AtomicUsize,
}

impl StatusSequence {
    fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for StatusSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        self.responses[i.min(self.responses.len() - 1)].clone()
    }
}

fn status(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": status }))
}

#[derive(Default)]
struct CountingNotifier {
    notified: AtomicUsize,
}

impl Notifier for CountingNotifier {
    fn notify_apply_ready(&self, _asset_path: &Path) {
        self.notified.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    server: MockServer,
    ctx: PipelineContext,
    notifier: Arc<CountingNotifier>,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let notifier = Arc::new(CountingNotifier::default());

    let config = WorkerConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        data_dir: dir.path().to_path_buf(),
        poll_interval: Duration::from_millis(10),
        poll_max_wait: Duration::from_millis(50),
        ..WorkerConfig::default()
    };
    let dyn_notifier: Arc<dyn Notifier> = notifier.clone();
    let ctx = PipelineContext::new(config, dyn_notifier).unwrap();

    Harness {
        server,
        ctx,
        notifier,
        _dir: dir,
    }
}

async fn mount_submit(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/generateVideo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jobId": "job-1",
            "downloadUrl": format!("{}/dl/job-1", server.uri()),
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn never_cancelled() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    std::mem::forget(tx);
    rx
}

#[tokio::test]
async fn test_pending_then_ready_completes_with_one_download() {
    let h = harness().await;
    mount_submit(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(StatusSequence::new(vec![
            status("pending"),
            status("pending"),
            status("ready"),
        ]))
        .expect(3)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/job-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"fresh video bytes".to_vec(), "video/mp4"),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = run_generate(&h.ctx, never_cancelled()).await;

    let expected_output = h.ctx.config.output_path();
    assert_eq!(
        outcome,
        PipelineOutcome::Completed {
            asset_path: expected_output.clone()
        }
    );

    // Exactly one write to the latest-asset slot, pointing at a real file.
    assert_eq!(
        h.ctx.store.latest_video().await.unwrap(),
        Some(expected_output.clone())
    );
    let bytes = tokio::fs::read(&expected_output).await.unwrap();
    assert_eq!(bytes, b"fresh video bytes");
}

#[tokio::test]
async fn test_remote_error_fails_permanently_without_download() {
    let h = harness().await;
    mount_submit(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(StatusSequence::new(vec![
            status("pending"),
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "error",
                "detail": "prompt rejected by backend",
            })),
        ]))
        .expect(2)
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/job-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let outcome = run_generate(&h.ctx, never_cancelled()).await;

    match outcome {
        PipelineOutcome::Failed { reason } => {
            assert!(reason.contains("prompt rejected by backend"))
        }
        other => panic!("expected permanent failure, got {:?}", other),
    }
    assert_eq!(h.ctx.store.latest_video().await.unwrap(), None);
}

#[tokio::test]
async fn test_poll_budget_exhaustion_is_retryable_without_download() {
    let h = harness().await;
    mount_submit(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(status("pending"))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/job-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let outcome = run_generate(&h.ctx, never_cancelled()).await;
    assert!(outcome.is_retryable(), "got {:?}", outcome);
    assert_eq!(h.ctx.store.latest_video().await.unwrap(), None);
}

#[tokio::test]
async fn test_json_download_with_200_fails_and_stages_nothing() {
    let h = harness().await;
    mount_submit(&h.server).await;

    Mock::given(method("GET"))
        .and(path("/status/job-1"))
        .respond_with(status("ready"))
        .mount(&h.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dl/job-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(br#"{"error": "render backend crashed"}"#.to_vec(), "application/json"),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let outcome = run_generate(&h.ctx, never_cancelled()).await;

    assert!(
        matches!(outcome, PipelineOutcome::Failed { .. }),
        "got {:?}",
        outcome
    );
    // Nothing became visible to consumers.
    assert_eq!(h.ctx.store.latest_video().await.unwrap(), None);
    assert!(!h.ctx.config.output_path().exists());
    assert!(!h.ctx.config.staging_dir().join("lockscreen_raw.mp4").exists());
}

#[tokio::test]
async fn test_submit_failure_is_retryable() {
    let h = harness().await;

    // No mocks mounted: submit gets an unexpected status from the server.
    let outcome = run_generate(&h.ctx, never_cancelled()).await;
    assert!(outcome.is_retryable(), "got {:?}", outcome);
}

#[tokio::test]
async fn test_apply_notifies_only_when_asset_exists() {
    let h = harness().await;

    run_apply(&h.ctx).await.unwrap();
    assert_eq!(h.notifier.notified.load(Ordering::SeqCst), 0);

    h.ctx
        .store
        .set_latest_video("/data/lock/lockscreen.mp4")
        .await
        .unwrap();

    run_apply(&h.ctx).await.unwrap();
    assert_eq!(h.notifier.notified.load(Ordering::SeqCst), 1);
}
