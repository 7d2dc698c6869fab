//! Per-host request pacing.
//!
//! A map from host to "earliest next fetch" timestamp, consulted when a
//! worker dequeues a URL. A host that is not yet ready causes the URL to
//! be re-queued rather than busy-waited on.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between fetches to the same host.
///
/// An interval of zero disables pacing entirely.
pub struct HostPacer {
    interval: Duration,
    next_allowed: Mutex<HashMap<String, Instant>>,
}

impl HostPacer {
    pub fn new(interval: Duration) -> Self {
        HostPacer {
            interval,
            next_allowed: Mutex::new(HashMap::new()),
        }
    }

    /// Attempts to reserve a fetch slot for `host`.
    ///
    /// On success the host's window is advanced, so at most one fetch per
    /// host runs per interval. On failure, returns how long to wait before
    /// the host is ready again.
    pub fn try_acquire(&self, host: &str) -> Result<(), Duration> {
        if self.interval.is_zero() {
            return Ok(());
        }

        let mut next_allowed = match self.next_allowed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        if let Some(&at) = next_allowed.get(host) {
            if at > now {
                return Err(at - now);
            }
        }
        next_allowed.insert(host.to_string(), now + self.interval);
        Ok(())
    }
}
