//! Per-host request spacing
//!
//! Each host gets its own async lock around the timestamp of its last request.
//! A caller holds that lock while it waits, so two tasks aimed at the same
//! host cannot both read a stale timestamp; tasks aimed at different hosts
//! never touch each other's lock.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Timestamp of the last request issued to a host
#[derive(Debug, Default)]
struct HostSlot {
    last_request: Option<Instant>,
}

/// Enforces a minimum spacing between requests to the same host
#[derive(Debug, Default)]
pub struct RateLimiter {
    hosts: DashMap<String, Arc<Mutex<HostSlot>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends until a request to `host` is permitted, then records it
    ///
    /// If less than `minimum_delay` has passed since the previous request to
    /// the host, waits out the remainder. The timestamp is updated on return,
    /// i.e. when the request is issued rather than when it completes.
    ///
    /// # Arguments
    ///
    /// * `host` - Host key of the request
    /// * `minimum_delay` - Required gap since the previous request
    pub async fn wait_before_next_request(&self, host: &str, minimum_delay: Duration) {
        // Clone the slot out so the map shard is not held across the await
        let slot = Arc::clone(&self.hosts.entry(host.to_string()).or_default());
        let mut slot = slot.lock().await;

        if let Some(previous) = slot.last_request {
            let elapsed = previous.elapsed();
            if elapsed < minimum_delay {
                let wait = minimum_delay - elapsed;
                tracing::debug!("Rate limiting {}: waiting {:?}", host, wait);
                tokio::time::sleep(wait).await;
            }
        }

        slot.last_request = Some(Instant::now());
    }

    /// Time of the last request recorded for `host`
    pub async fn last_request(&self, host: &str) -> Option<Instant> {
        let slot = self.hosts.get(host).map(|entry| Arc::clone(entry.value()))?;
        let slot = slot.lock().await;
        slot.last_request
    }

    /// Number of hosts with recorded state
    pub fn tracked_hosts(&self) -> usize {
        self.hosts.len()
    }

    /// Forgets every host
    pub fn clear_state(&self) {
        self.hosts.clear();
    }
}
