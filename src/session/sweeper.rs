use super::SessionAuthority;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Runs `sweep_expired` every `every` until the returned task is aborted.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sweeper(authority: Arc<SessionAuthority>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing can have expired yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = authority.sweep_expired();
            if removed > 0 {
                info!(
                    "Swept {} expired sessions, {} remain",
                    removed,
                    authority.active_sessions()
                );
            } else {
                debug!("Session sweep found nothing to remove");
            }
        }
    })
}
