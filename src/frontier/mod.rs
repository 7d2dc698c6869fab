//! The frontier: a deduplicating FIFO work queue of URLs still to check.
//!
//! The dedup key is the normalized URL. Every URL enters the queue at most
//! once for its lifetime; `requeue` exists only so a worker can put back a
//! URL it could not fetch yet because of per-host pacing.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use crate::models::UrlRecord;

#[derive(Default)]
struct FrontierInner {
    queue: VecDeque<UrlRecord>,
    seen: HashSet<String>,
}

/// Shared, mutex-guarded queue plus seen-set.
///
/// The lock is held only for the duration of a single queue operation,
/// never across I/O. FIFO order keeps runs reproducible for a given
/// discovery sequence.
#[derive(Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FrontierInner> {
        // A worker panicking mid-operation must not wedge the whole crawl.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Enqueues a record unless its URL has been seen before.
    ///
    /// Returns `true` if the record was accepted, `false` if it was a
    /// duplicate and silently dropped.
    pub fn offer(&self, record: UrlRecord) -> bool {
        let mut inner = self.lock();
        if !inner.seen.insert(record.url.clone()) {
            return false;
        }
        inner.queue.push_back(record);
        true
    }

    /// Marks a URL as seen without queueing it.
    ///
    /// Used for URLs whose fate is decided at discovery time (filtered,
    /// checked out-of-band like the seed). Returns `true` if the URL was
    /// not seen before.
    pub fn suppress(&self, url: &str) -> bool {
        self.lock().seen.insert(url.to_string())
    }

    /// Puts a record back at the end of the queue, bypassing dedup.
    ///
    /// Only for records previously obtained from `take` that could not be
    /// processed yet (per-host pacing hold).
    pub fn requeue(&self, record: UrlRecord) {
        self.lock().queue.push_back(record);
    }

    /// Removes and returns the oldest queued record.
    pub fn take(&self) -> Option<UrlRecord> {
        self.lock().queue.pop_front()
    }

    /// Whether a URL has already been offered or suppressed.
    pub fn seen(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }

    /// Number of records currently queued.
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    /// Empties the queue, returning everything still waiting.
    ///
    /// Used at shutdown to report unvisited URLs as skipped.
    pub fn drain(&self) -> Vec<UrlRecord> {
        self.lock().queue.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrlClass;

    fn record(url: &str) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            referrer: None,
            context: None,
            class: UrlClass::Internal,
            depth: 1,
        }
    }

    #[test]
    fn test_offer_is_idempotent() {
        let frontier = Frontier::new();
        assert!(frontier.offer(record("https://example.com/a")));
        assert!(!frontier.offer(record("https://example.com/a")));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_take_is_fifo() {
        let frontier = Frontier::new();
        frontier.offer(record("https://example.com/1"));
        frontier.offer(record("https://example.com/2"));
        frontier.offer(record("https://example.com/3"));

        assert_eq!(frontier.take().unwrap().url, "https://example.com/1");
        assert_eq!(frontier.take().unwrap().url, "https://example.com/2");
        assert_eq!(frontier.take().unwrap().url, "https://example.com/3");
        assert!(frontier.take().is_none());
    }

    #[test]
    fn test_taken_urls_stay_seen() {
        let frontier = Frontier::new();
        frontier.offer(record("https://example.com/a"));
        let _ = frontier.take();
        assert!(frontier.seen("https://example.com/a"));
        assert!(!frontier.offer(record("https://example.com/a")));
    }

    #[test]
    fn test_suppress_blocks_future_offers() {
        let frontier = Frontier::new();
        assert!(frontier.suppress("https://example.com/skipped"));
        assert!(!frontier.suppress("https://example.com/skipped"));
        assert!(!frontier.offer(record("https://example.com/skipped")));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_requeue_bypasses_dedup() {
        let frontier = Frontier::new();
        frontier.offer(record("https://example.com/paced"));
        let taken = frontier.take().unwrap();
        frontier.requeue(taken);
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.take().unwrap().url, "https://example.com/paced");
    }

    #[test]
    fn test_drain_empties_queue() {
        let frontier = Frontier::new();
        frontier.offer(record("https://example.com/a"));
        frontier.offer(record("https://example.com/b"));

        let drained = frontier.drain();
        assert_eq!(drained.len(), 2);
        assert!(frontier.is_empty());
        // Seen set survives the drain
        assert!(frontier.seen("https://example.com/a"));
    }
}
