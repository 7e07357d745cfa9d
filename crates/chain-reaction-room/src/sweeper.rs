//! Periodic deletion of stale rooms.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

use crate::{RoomRegistry, SweepConfig};

/// Shortest interval the sweeper will run at.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns a task that sweeps `registry` every `config.interval`, deleting
/// rooms older than `config.max_age`.
///
/// The first sweep happens one interval after spawning. The registry lock
/// is held for the duration of each sweep only. Abort the returned handle
/// to stop the task.
pub fn spawn_sweeper(registry: Arc<Mutex<RoomRegistry>>, config: SweepConfig) -> JoinHandle<()> {
    let period = if config.interval < MIN_INTERVAL {
        warn!(interval = ?config.interval, "sweep interval too short, clamping to 1s");
        MIN_INTERVAL
    } else {
        config.interval
    };

    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let removed = registry.lock().await.sweep_expired(config.max_age);
            if !removed.is_empty() {
                info!(count = removed.len(), "expired rooms swept");
            }
        }
    })
}
