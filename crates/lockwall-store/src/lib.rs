//! Durable preferences store.
//!
//! A small key/value record ([`UserPrefs`]) persisted as one JSON file.
//! Every write replaces the whole file via a temp sibling plus `rename`,
//! so concurrent writers never leave a torn record behind: each writer
//! lands a complete file and the last rename wins.

pub mod error;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use lockwall_models::UserPrefs;

pub use error::{StoreError, StoreResult};

/// File-backed preferences store.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    /// Create a store over the given file path. Nothing is read or created
    /// until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current preferences.
    ///
    /// A missing file yields the default record; a file that exists but
    /// does not parse is reported as [`StoreError::Corrupt`] rather than
    /// silently replaced.
    pub async fn load(&self) -> StoreResult<UserPrefs> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No preferences file yet, using defaults");
                return Ok(UserPrefs::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(&self.path, e.to_string()))
    }

    /// Persist the whole record, replacing any previous contents.
    pub async fn save(&self, prefs: &UserPrefs) -> StoreResult<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StoreError::InvalidPath(self.path.clone()))?;
        tokio::fs::create_dir_all(parent).await?;

        let json = serde_json::to_vec_pretty(prefs)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, &json).await?;
        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                warn!(temp = %temp.display(), error = %cleanup, "Failed to remove orphaned temp file");
            }
            return Err(e.into());
        }

        debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }

    /// Record the path of a freshly produced asset.
    ///
    /// This is the pipeline's only write into the store; it replaces the
    /// single `latest_video_path` field and leaves the rest of the record
    /// as currently persisted.
    pub async fn set_latest_video(&self, asset_path: impl Into<PathBuf>) -> StoreResult<()> {
        let mut prefs = self.load().await?;
        prefs.latest_video_path = Some(asset_path.into());
        self.save(&prefs).await
    }

    /// Path of the most recently produced asset, if any run has completed.
    pub async fn latest_video(&self) -> StoreResult<Option<PathBuf>> {
        Ok(self.load().await?.latest_video_path)
    }

    // Unique per write so racing writers never share a temp file.
    fn temp_path(&self) -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);

        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "prefs".into());
        name.push(format!(".tmp.{}.{}", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockwall_models::AspectRatio;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PrefsStore {
        PrefsStore::new(dir.path().join("user_prefs.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let prefs = store.load().await.unwrap();
        assert_eq!(prefs, UserPrefs::default());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let prefs = UserPrefs {
            cast: "a corgi".into(),
            aspect: AspectRatio::LANDSCAPE,
            duration_secs: 5,
            gen_time: "06:15".into(),
            ..UserPrefs::default()
        };
        store.save(&prefs).await.unwrap();

        assert_eq!(store.load().await.unwrap(), prefs);
    }

    #[tokio::test]
    async fn test_set_latest_video_preserves_other_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let prefs = UserPrefs {
            cast: "a corgi".into(),
            ..UserPrefs::default()
        };
        store.save(&prefs).await.unwrap();

        store.set_latest_video("/data/lock/lockscreen.mp4").await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.cast, "a corgi");
        assert_eq!(
            loaded.latest_video_path,
            Some(PathBuf::from("/data/lock/lockscreen.mp4"))
        );
        assert_eq!(
            store.latest_video().await.unwrap(),
            Some(PathBuf::from("/data/lock/lockscreen.mp4"))
        );
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = PrefsStore::new(dir.path().join("nested/deeper/user_prefs.json"));

        store.save(&UserPrefs::default()).await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported_not_replaced() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        tokio::fs::write(store.path(), b"{not json").await.unwrap();

        assert!(matches!(
            store.load().await,
            Err(StoreError::Corrupt { .. })
        ));
        // The bad file is left in place for inspection.
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(&UserPrefs::default()).await.unwrap();
        store.set_latest_video("/tmp/a.mp4").await.unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().into_string().unwrap());
        }
        assert_eq!(names, vec!["user_prefs.json".to_string()]);
    }
}
