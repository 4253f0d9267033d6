//! Named daily triggers with replace-on-register semantics.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Name of the recurring generation trigger.
pub const GENERATE_TRIGGER: &str = "generate";

/// Name of the recurring apply-notification trigger.
pub const APPLY_TRIGGER: &str = "apply";

/// Period of every registered trigger.
const DAILY_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Connectivity gate checked before each trigger firing.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Default probe: assume the network is reachable.
#[derive(Debug, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Recurring trigger registry.
///
/// Each trigger is identified by a stable name; registering under an
/// existing name cancels the prior task and replaces it, so repeated
/// registration is idempotent and never duplicates firings. Triggers sleep
/// their initial delay, then fire on a 24-hour period until cancelled.
pub struct DailyScheduler {
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
    connectivity: Arc<dyn Connectivity>,
}

impl Default for DailyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyScheduler {
    /// Create a scheduler with the default connectivity probe.
    pub fn new() -> Self {
        Self::with_connectivity(Arc::new(AlwaysOnline))
    }

    /// Create a scheduler with a custom connectivity probe.
    pub fn with_connectivity(connectivity: Arc<dyn Connectivity>) -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            connectivity,
        }
    }

    /// Register-or-replace the named daily trigger.
    ///
    /// Firings that find the connectivity probe offline are skipped and
    /// logged; the trigger stays armed for the next period.
    pub async fn register<F, Fut>(&self, name: &str, initial_delay: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;
        if let Some(previous) = tasks.remove(name) {
            previous.abort();
            info!(trigger = name, "Replaced existing trigger registration");
        }

        let connectivity = Arc::clone(&self.connectivity);
        let trigger = name.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(initial_delay).await;
            loop {
                if connectivity.is_online() {
                    info!(trigger = %trigger, "Trigger fired");
                    job().await;
                } else {
                    warn!(trigger = %trigger, "Offline, skipping this firing");
                }
                tokio::time::sleep(DAILY_PERIOD).await;
            }
        });

        tasks.insert(name.to_string(), handle);
        info!(
            trigger = name,
            initial_delay_secs = initial_delay.as_secs(),
            "Registered daily trigger"
        );
    }

    /// Cancel the named trigger. Returns whether it existed.
    pub async fn cancel(&self, name: &str) -> bool {
        let mut tasks = self.tasks.lock().await;
        match tasks.remove(name) {
            Some(handle) => {
                handle.abort();
                info!(trigger = name, "Cancelled trigger");
                true
            }
            None => false,
        }
    }

    /// Check whether a trigger is currently registered.
    pub async fn is_registered(&self, name: &str) -> bool {
        self.tasks.lock().await.contains_key(name)
    }

    /// Number of active registrations.
    pub async fn active_count(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Cancel every registration.
    pub async fn shutdown(&self) {
        let mut tasks = self.tasks.lock().await;
        for (name, handle) in tasks.drain() {
            handle.abort();
            info!(trigger = %name, "Cancelled trigger on shutdown");
        }
    }
}
