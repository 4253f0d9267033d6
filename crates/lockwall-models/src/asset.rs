//! Staged asset produced by a download.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A downloaded asset sitting in the staging directory.
///
/// Only ever constructed after a complete write; consumers never observe a
/// partially written file under this path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedAsset {
    /// Local path of the fully written file
    pub local_path: PathBuf,
    /// Declared media type of the response body
    pub content_type: String,
}

/// Check whether a declared media type is acceptable for staging.
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("video/")
}
