//! Notifier seam for the external alert surface.

use std::path::Path;

use tracing::info;

/// External collaborator that shows a user-actionable alert when a fresh
/// asset is ready to apply. The action behind the alert (opening the
/// renderer-selection flow) belongs to the platform, not to this crate.
pub trait Notifier: Send + Sync {
    fn notify_apply_ready(&self, asset_path: &Path);
}

/// Structured-log notifier; stands in where no platform surface is wired.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_apply_ready(&self, asset_path: &Path) {
        info!(
            asset_path = %asset_path.display(),
            "New lock-screen asset ready to apply"
        );
    }
}
