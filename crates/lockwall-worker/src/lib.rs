//! Pipeline orchestration and daily scheduling.
//!
//! Composes the generation client, asset fetcher, and post-processor into
//! one unit of work, classifies its outcome, and drives it from named
//! daily triggers or a manual invocation.

pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod schedule;
pub mod scheduler;
pub mod settings;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use notify::{LogNotifier, Notifier};
pub use pipeline::{run_apply, run_generate, PipelineContext};
pub use schedule::{compute_next_run, NextRun};
pub use scheduler::{
    AlwaysOnline, Connectivity, DailyScheduler, APPLY_TRIGGER, GENERATE_TRIGGER,
};
pub use settings::{apply_settings, SettingsUpdate};
