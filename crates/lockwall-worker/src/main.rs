//! Daily generation daemon.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lockwall_worker::{
    compute_next_run, run_apply, run_generate, DailyScheduler, LogNotifier, PipelineContext,
    WorkerConfig, APPLY_TRIGGER, GENERATE_TRIGGER,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting lockwall-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let ctx = match PipelineContext::new(config.clone(), Arc::new(LogNotifier)) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to create pipeline context: {}", e);
            std::process::exit(1);
        }
    };

    // In-flight stages observe this signal; shutdown cancels whichever
    // suspension point is active, including a running transform.
    let (cancel_tx, cancel_rx) = watch::channel(false);

    let scheduler = DailyScheduler::new();
    if let Err(e) = register_triggers(&ctx, &scheduler, cancel_rx).await {
        error!("Failed to register triggers: {}", e);
        std::process::exit(1);
    }

    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");

    let _ = cancel_tx.send(true);
    scheduler.shutdown().await;

    info!("Worker shutdown complete");
}

async fn register_triggers(
    ctx: &Arc<PipelineContext>,
    scheduler: &DailyScheduler,
    cancel_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let prefs = ctx.store.load().await?;
    prefs.validate()?;

    let now = Local::now().naive_local();

    let gen_next = compute_next_run(&prefs.gen_time, now, ctx.config.min_lead_minutes)?;
    info!(
        requested = %gen_next.requested_text,
        scheduled_at = %gen_next.scheduled_at,
        delay_minutes = gen_next.delay_minutes,
        min_lead_applied = gen_next.min_lead_applied,
        "Scheduling daily generation"
    );

    let gen_ctx = Arc::clone(ctx);
    scheduler
        .register(GENERATE_TRIGGER, gen_next.delay(), move || {
            let ctx = Arc::clone(&gen_ctx);
            let cancel = cancel_rx.clone();
            async move {
                // Scheduled runs log their outcome and rely on the next
                // firing; the trigger framework owns retry cadence.
                let _ = run_generate(&ctx, cancel).await;
            }
        })
        .await;

    if let Some(apply_time) = &prefs.apply_time {
        let apply_next = compute_next_run(apply_time, now, ctx.config.min_lead_minutes)?;
        info!(
            requested = %apply_next.requested_text,
            scheduled_at = %apply_next.scheduled_at,
            delay_minutes = apply_next.delay_minutes,
            "Scheduling daily apply notification"
        );

        let apply_ctx = Arc::clone(ctx);
        scheduler
            .register(APPLY_TRIGGER, apply_next.delay(), move || {
                let ctx = Arc::clone(&apply_ctx);
                async move {
                    if let Err(e) = run_apply(&ctx).await {
                        warn!("Apply stage failed: {}", e);
                    }
                }
            })
            .await;
    }

    Ok(())
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("lockwall=info".parse().expect("valid directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
