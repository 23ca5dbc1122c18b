use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};

use crate::runtime::{ChatRuntime, RuntimeLauncher};

/// Cadence of readiness probes while the runtime boots
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Head start given to a freshly launched runtime before probing resumes
pub const BOOTSTRAP_GRACE: Duration = Duration::from_millis(500);

/// Background task that brings the inference runtime up and reports when it
/// answers probes.
///
/// The runtime is probed once up front; if it is already serving, no
/// launch happens. Otherwise the launcher starts it and probes repeat
/// every [`POLL_INTERVAL`] after a [`BOOTSTRAP_GRACE`] head start, until
/// the runtime answers. A launch failure is terminal: readiness stays
/// false for the life of the process. Dropping the monitor stops the
/// polling.
pub struct ReadyMonitor {
    rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl ReadyMonitor {
    pub fn spawn(runtime: Arc<dyn ChatRuntime>, launcher: Arc<dyn RuntimeLauncher>) -> Self {
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            if runtime.is_available().await {
                info!("inference runtime already up");
                let _ = tx.send(true);
                return;
            }

            if let Err(e) = launcher.launch() {
                warn!("could not start the runtime, assistant stays disabled: {e:#}");
                return;
            }

            time::sleep(BOOTSTRAP_GRACE).await;

            let mut ticker = time::interval(POLL_INTERVAL);
            loop {
                ticker.tick().await;
                if runtime.is_available().await {
                    info!("inference runtime is ready");
                    let _ = tx.send(true);
                    return;
                }
            }
        });

        Self { rx, task }
    }

    /// Latest readiness state without waiting
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Receiver for callers that want to await the state change
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }
}

impl Drop for ReadyMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
