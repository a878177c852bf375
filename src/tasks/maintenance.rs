//! Maintenance Task
//!
//! Background task that periodically reaps expired entries and trims the
//! cache to its limit. The engine never schedules work itself; this task is
//! just another caller.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::SharedCache;

/// Spawns a background task that reaps then trims at a fixed interval.
///
/// Store failures are logged and the loop keeps going; the next tick retries.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_maintenance_task(state.cache.clone(), 1);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_maintenance_task(cache: SharedCache, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting maintenance task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let cache = cache.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let reaped = cache.reap_expired()?;
                let trimmed = cache.trim_to_limit()?;
                Ok::<_, crate::error::CacheError>((reaped, trimmed))
            })
            .await;

            match outcome {
                Ok(Ok((reaped, trimmed))) if reaped + trimmed.total() > 0 => {
                    info!(
                        reaped,
                        trim_reaped = trimmed.reaped,
                        evicted = trimmed.evicted,
                        "maintenance removed entries"
                    );
                }
                Ok(Ok(_)) => debug!("maintenance: nothing to remove"),
                Ok(Err(err)) => warn!(error = %err, "maintenance pass failed"),
                Err(err) => warn!(error = %err, "maintenance pass panicked"),
            }
        }
    })
}
