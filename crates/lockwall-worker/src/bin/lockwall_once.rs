//! Manual "generate now" run.
//!
//! Runs the same pipeline as the daemon's daily trigger, against the same
//! store and the same latest-asset slot, deliberately without any mutual
//! exclusion between the two.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lockwall_models::PipelineOutcome;
use lockwall_worker::{run_generate, LogNotifier, Notifier, PipelineContext, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(true).with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("lockwall=info".parse().expect("valid directive")),
        )
        .init();

    let config = WorkerConfig::from_env();
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let ctx = match PipelineContext::new(config, Arc::clone(&notifier)) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Failed to create pipeline context: {}", e);
            std::process::exit(1);
        }
    };

    // Ctrl-C cancels the in-flight stage, including a running transform.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Cancelling generation run");
        let _ = cancel_tx.send(true);
    });

    let outcome = run_generate(&ctx, cancel_rx).await;

    match outcome {
        PipelineOutcome::Completed { asset_path } => {
            notifier.notify_apply_ready(&asset_path);
            println!("Generated new lock-screen asset: {}", asset_path.display());
        }
        PipelineOutcome::Retryable { reason } => {
            eprintln!("Generation failed, retrying later may succeed: {}", reason);
            std::process::exit(2);
        }
        PipelineOutcome::Failed { reason } => {
            eprintln!("Generation failed permanently: {}", reason);
            std::process::exit(1);
        }
    }
}
