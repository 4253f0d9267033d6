//! Settings save plus trigger re-registration.

use std::future::Future;

use chrono::NaiveDateTime;
use tracing::info;

use lockwall_models::{normalize_time, AspectRatio, UserPrefs};
use lockwall_store::PrefsStore;

use crate::error::WorkerResult;
use crate::schedule::{compute_next_run, NextRun};
use crate::scheduler::{DailyScheduler, GENERATE_TRIGGER};

/// A settings update from a configuration surface, times still raw.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    pub cast: String,
    pub background: String,
    pub aspect: AspectRatio,
    pub duration_secs: u32,
    pub gen_time: String,
    pub apply_time: Option<String>,
}

/// Normalize, validate, persist, and re-register the generation trigger.
///
/// Validation happens before any mutation: a bad time or duration leaves
/// both the store and the trigger registry untouched. The latest-asset
/// path is carried over unchanged; only the pipeline writes it.
pub async fn apply_settings<F, Fut>(
    store: &PrefsStore,
    scheduler: &DailyScheduler,
    min_lead_minutes: i64,
    now: NaiveDateTime,
    update: SettingsUpdate,
    generate_job: F,
) -> WorkerResult<NextRun>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let gen_time = normalize_time(&update.gen_time)?;
    let apply_time = update
        .apply_time
        .as_deref()
        .map(normalize_time)
        .transpose()?;

    let current = store.load().await?;
    let prefs = UserPrefs {
        cast: update.cast,
        background: update.background,
        aspect: update.aspect,
        duration_secs: update.duration_secs,
        gen_time: gen_time.clone(),
        apply_time,
        latest_video_path: current.latest_video_path,
    };
    prefs.validate()?;

    let next = compute_next_run(&gen_time, now, min_lead_minutes)?;

    store.save(&prefs).await?;
    scheduler
        .register(GENERATE_TRIGGER, next.delay(), generate_job)
        .await;

    info!(
        requested = %next.requested_text,
        scheduled_at = %next.scheduled_at,
        delay_minutes = next.delay_minutes,
        min_lead_applied = next.min_lead_applied,
        "Saved settings and scheduled daily generation"
    );
    Ok(next)
}
