//! Shared data models for the lockwall pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - User preferences (the durable configuration record)
//! - Time-of-day normalization
//! - Generation jobs and their remote status
//! - Staged assets and the pipeline outcome

pub mod aspect;
pub mod asset;
pub mod job;
pub mod outcome;
pub mod prefs;
pub mod timeofday;

// Re-export common types
pub use aspect::{AspectRatio, AspectRatioParseError};
pub use asset::{is_video_content_type, StagedAsset};
pub use job::{GenerationJob, GenerationRequest, JobStatus};
pub use outcome::PipelineOutcome;
pub use prefs::{PrefsError, UserPrefs};
pub use timeofday::{normalize_time, parse_canonical, TimeParseError};
