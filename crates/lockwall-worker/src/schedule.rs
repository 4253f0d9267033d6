//! Next-run computation for the daily triggers.

use std::time::Duration;

use chrono::NaiveDateTime;

use lockwall_models::parse_canonical;

use crate::error::WorkerResult;

/// One computed next-run record.
///
/// Created fresh on every scheduling call and handed to the trigger
/// registration; never persisted. The trigger keeps only the delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextRun {
    /// The canonical time-of-day that was requested
    pub requested_text: String,
    /// Absolute instant of the next firing
    pub scheduled_at: NaiveDateTime,
    /// Whole minutes from now until the firing
    pub delay_minutes: i64,
    /// Whether the minimum-lead clamp displaced the requested wall-clock time
    pub min_lead_applied: bool,
}

impl NextRun {
    /// The initial delay for trigger registration.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_minutes as u64 * 60)
    }
}

/// Compute the next firing for a requested wall-clock time.
///
/// The candidate is today at the requested hour and minute with seconds
/// zeroed; a candidate not strictly after `now` moves to tomorrow, so a
/// request equal to the current minute counts as already passed rather
/// than due immediately. When the resulting whole-minute delay falls under
/// `min_lead_minutes` the delay is clamped and `scheduled_at` recomputed;
/// honoring the platform's minimum lead wins over hitting the exact
/// requested wall-clock time.
pub fn compute_next_run(
    requested: &str,
    now: NaiveDateTime,
    min_lead_minutes: i64,
) -> WorkerResult<NextRun> {
    let time = parse_canonical(requested)?;

    let mut scheduled_at = now.date().and_time(time);
    if scheduled_at <= now {
        scheduled_at = scheduled_at + chrono::Duration::days(1);
    }

    let mut delay_minutes = (scheduled_at - now).num_minutes();
    let mut min_lead_applied = false;
    if delay_minutes < min_lead_minutes {
        delay_minutes = min_lead_minutes;
        scheduled_at = now + chrono::Duration::minutes(min_lead_minutes);
        min_lead_applied = true;
    }

    Ok(NextRun {
        requested_text: requested.to_string(),
        scheduled_at,
        delay_minutes,
        min_lead_applied,
    })
}
