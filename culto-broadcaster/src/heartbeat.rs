use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::events::BroadcastEvent;
use crate::registry::ConnectionRegistry;

/// Periodic heartbeat emitter keeping client streams alive.
///
/// Ticks are scheduled from the nominal start time, so the cadence does not
/// drift with how long each broadcast takes. Missed ticks are skipped rather
/// than bursted.
pub struct HeartbeatScheduler {
    registry: Arc<ConnectionRegistry>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatScheduler {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            task: Mutex::new(None),
        }
    }

    /// Start emitting heartbeats every `interval`. No-op if already running.
    pub async fn start(&self, interval: Duration) {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::debug!("Heartbeat scheduler already running");
            return;
        }

        let registry = Arc::clone(&self.registry);
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the cadence starts one
            // interval from now.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                registry.broadcast(BroadcastEvent::heartbeat()).await;
            }
        }));

        tracing::info!(interval_ms = interval.as_millis() as u64, "Heartbeat scheduler started");
    }

    /// Cancel the heartbeat timer. No-op if already stopped.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        match task.take() {
            Some(handle) => {
                handle.abort();
                tracing::info!("Heartbeat scheduler stopped");
            }
            None => tracing::debug!("Heartbeat scheduler already stopped"),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}
