//! Sweeper: periodically evicts idle sessions from the store.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::session::SessionStore;

/// How often the sweeper runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Sessions idle longer than this are evicted.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

pub struct Sweeper {
    store: SessionStore,
    interval: Duration,
    max_idle: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl Sweeper {
    pub fn new(store: SessionStore, shutdown: broadcast::Receiver<()>) -> Self {
        Self::with_timing(store, SWEEP_INTERVAL, SESSION_IDLE_TIMEOUT, shutdown)
    }

    pub fn with_timing(
        store: SessionStore,
        interval: Duration,
        max_idle: Duration,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            store,
            interval,
            max_idle,
            shutdown,
        }
    }

    /// Sweep once per interval until the shutdown channel fires or closes.
    pub async fn run(mut self) {
        let start = tokio::time::Instant::now() + self.interval;
        let mut interval = tokio::time::interval_at(start, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            max_idle_secs = self.max_idle.as_secs(),
            "session sweeper starting"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("session sweeper shutting down");
                    return;
                }

                _ = interval.tick() => {
                    let removed = self.store.sweep(self.max_idle).await;
                    if removed > 0 {
                        tracing::debug!(removed, "evicted idle sessions");
                    }
                }
            }
        }
    }
}
