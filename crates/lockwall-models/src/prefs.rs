//! User preferences record.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

use crate::aspect::AspectRatio;
use crate::timeofday::{parse_canonical, TimeParseError};

/// Allowed clip duration in seconds.
pub const DURATION_RANGE: RangeInclusive<u32> = 1..=10;

/// Durable user preferences.
///
/// Field names on disk stay the flat key names the store has always used
/// (`cast`, `bg`, `duration`, ...). Mutated only through a whole-record
/// save plus the pipeline's single latest-path write; read fresh before
/// every pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPrefs {
    /// Subject of the generated clip
    pub cast: String,

    /// Scene backdrop
    #[serde(rename = "bg")]
    pub background: String,

    /// Output aspect ratio
    pub aspect: AspectRatio,

    /// Clip length in seconds
    #[serde(rename = "duration")]
    pub duration_secs: u32,

    /// Daily generation time, canonical `HH:mm`
    pub gen_time: String,

    /// Daily apply-notification time, canonical `HH:mm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_time: Option<String>,

    /// Path of the most recently produced asset, written only by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_video_path: Option<PathBuf>,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            cast: "a cute small standing Pomeranian in a blue shirt".to_string(),
            background: "the Arc de Triomphe in Paris".to_string(),
            aspect: AspectRatio::PORTRAIT,
            duration_secs: 8,
            gen_time: "11:29".to_string(),
            apply_time: Some("03:30".to_string()),
            latest_video_path: None,
        }
    }
}

/// Validation errors for a preferences record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrefsError {
    #[error("Duration must be between {min} and {max} seconds, got {got}")]
    DurationOutOfRange { got: u32, min: u32, max: u32 },

    #[error("Invalid generation time: {0}")]
    InvalidGenTime(TimeParseError),

    #[error("Invalid apply time: {0}")]
    InvalidApplyTime(TimeParseError),
}

impl UserPrefs {
    /// Check the record invariants: duration in range, time fields canonical.
    pub fn validate(&self) -> Result<(), PrefsError> {
        if !DURATION_RANGE.contains(&self.duration_secs) {
            return Err(PrefsError::DurationOutOfRange {
                got: self.duration_secs,
                min: *DURATION_RANGE.start(),
                max: *DURATION_RANGE.end(),
            });
        }

        parse_canonical(&self.gen_time).map_err(PrefsError::InvalidGenTime)?;

        if let Some(apply_time) = &self.apply_time {
            parse_canonical(apply_time).map_err(PrefsError::InvalidApplyTime)?;
        }

        Ok(())
    }
}
