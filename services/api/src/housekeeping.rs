//! services/api/src/housekeeping.rs
//!
//! Background expiry of idle quiz sessions. Expiry is not part of the quiz
//! rules; it only keeps the in-memory store from growing without bound.

use chrono::{DateTime, Utc};
use quiz_core::ports::{PortError, PortResult, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// The instant before which a session idle for `ttl` counts as expired, or
/// `None` when `ttl` reaches past the range of `DateTime<Utc>`.
pub fn expiry_cutoff(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl).ok()?;
    now.checked_sub_signed(ttl)
}

/// Removes every session idle for longer than `ttl`.
pub async fn purge_once(store: &dyn SessionStore, ttl: Duration) -> PortResult<usize> {
    let cutoff = expiry_cutoff(Utc::now(), ttl).ok_or_else(|| {
        PortError::Unexpected(format!("session TTL of {}s is out of range", ttl.as_secs()))
    })?;
    store.purge_expired(cutoff).await
}

/// Runs `purge_once` periodically until `token` is cancelled.
pub fn spawn_session_purger(
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    let period = ttl.min(Duration::from_secs(60)).max(Duration::from_secs(1));
    tokio::spawn(async move {
        info!("Expiring sessions idle for more than {}s", ttl.as_secs());
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Session purger stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match purge_once(store.as_ref(), ttl).await {
                        Ok(0) => {}
                        Ok(n) => info!("Expired {} idle sessions", n),
                        Err(e) => error!("Failed to purge sessions: {:?}", e),
                    }
                }
            }
        }
    })
}
