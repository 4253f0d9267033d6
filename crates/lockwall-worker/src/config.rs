//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use lockwall_client::PollConfig;
use lockwall_media::PostProcessMode;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8484";

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base URL of the generation service
    pub base_url: Url,
    /// Root directory for preferences, staging, and output files
    pub data_dir: PathBuf,
    /// Delay between consecutive status polls
    pub poll_interval: Duration,
    /// Cumulative poll budget per job
    pub poll_max_wait: Duration,
    /// Minimum scheduling lead time in minutes
    pub min_lead_minutes: i64,
    /// How the staged asset becomes the canonical one
    pub post_process: PostProcessMode,
    /// Wall-clock bound for the transform stage
    pub transform_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: PathBuf::from("/tmp/lockwall"),
            poll_interval: Duration::from_millis(2000),
            poll_max_wait: Duration::from_secs(600),
            min_lead_minutes: 5,
            post_process: PostProcessMode::Copy,
            transform_timeout: Duration::from_secs(300),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("LOCKWALL_BASE_URL")
                .ok()
                .and_then(|s| Url::parse(&s).ok())
                .unwrap_or_else(default_base_url),
            data_dir: std::env::var("LOCKWALL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/lockwall")),
            poll_interval: Duration::from_millis(
                std::env::var("LOCKWALL_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            poll_max_wait: Duration::from_millis(
                std::env::var("LOCKWALL_POLL_MAX_WAIT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600_000),
            ),
            min_lead_minutes: std::env::var("LOCKWALL_MIN_LEAD_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            post_process: std::env::var("LOCKWALL_POST_PROCESS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            transform_timeout: Duration::from_secs(
                std::env::var("LOCKWALL_TRANSFORM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
        }
    }

    /// Path of the preferences file.
    pub fn prefs_path(&self) -> PathBuf {
        self.data_dir.join("user_prefs.json")
    }

    /// Directory downloads are staged into.
    pub fn staging_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// The single canonical asset path.
    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join("lock").join("lockscreen.mp4")
    }

    /// Polling parameters for the job client.
    pub fn poll(&self) -> PollConfig {
        PollConfig {
            interval: self.poll_interval,
            max_wait: self.poll_max_wait,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8484/");
        assert_eq!(config.min_lead_minutes, 5);
        assert_eq!(config.post_process, PostProcessMode::Copy);
        assert_eq!(config.poll().interval, Duration::from_millis(2000));
    }

    #[test]
    fn test_derived_paths() {
        let config = WorkerConfig {
            data_dir: PathBuf::from("/data/lockwall"),
            ..WorkerConfig::default()
        };
        assert_eq!(
            config.prefs_path(),
            PathBuf::from("/data/lockwall/user_prefs.json")
        );
        assert_eq!(config.staging_dir(), PathBuf::from("/data/lockwall/raw"));
        assert_eq!(
            config.output_path(),
            PathBuf::from("/data/lockwall/lock/lockscreen.mp4")
        );
    }
}
