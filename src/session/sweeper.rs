//! Recurring expiry sweep task

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::session::SessionRegistry;

/// Spawn the background task that periodically evicts expired sessions.
///
/// Idempotent per tick; skipping a run only delays cleanup, it never affects
/// safety, so missed ticks are delayed rather than bursted.
pub fn spawn_sweeper(registry: Arc<SessionRegistry>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately; consume it so sweeps start one
        // full period after startup
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = registry.sweep_expired().await;
            if evicted > 0 {
                tracing::info!(evicted, "sweep removed expired sessions");
            } else {
                tracing::debug!("sweep found nothing to remove");
            }
        }
    })
}
