//! Sliding-window flood tracking.
//!
//! Keeps one timestamp queue per (chat, author). Updates for a key happen
//! under the map's shard lock, so concurrent messages from the same author
//! never lose or duplicate entries.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Flood subsystem settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloodSettings {
    /// Messages allowed inside the window; one more is a violation.
    pub limit: usize,
    /// Trailing window length.
    pub window: Duration,
}

/// Per-(chat, author) message timestamps (in-memory, lock-free per shard).
#[derive(Clone)]
pub struct FloodTracker {
    window: Duration,
    data: Arc<DashMap<(i64, i64), VecDeque<Instant>>>,
}

impl FloodTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            data: Arc::new(DashMap::new()),
        }
    }

    /// Record a message at `now` and return how many messages from this
    /// author fall inside the trailing window, the current one included.
    pub fn record_and_check(&self, chat_id: i64, author_id: i64, now: Instant) -> usize {
        let mut times = self.data.entry((chat_id, author_id)).or_default();

        // Timestamps are appended in order, so expired ones sit at the front
        while let Some(&oldest) = times.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                times.pop_front();
            } else {
                break;
            }
        }

        times.push_back(now);
        times.len()
    }

    /// Drop authors whose newest message has left the window.
    ///
    /// Returns the number of removed entries.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.data.len();
        self.data.retain(|_, times| {
            times
                .back()
                .is_some_and(|&newest| now.saturating_duration_since(newest) < self.window)
        });
        before.saturating_sub(self.data.len())
    }

    /// Number of tracked (chat, author) pairs.
    pub fn tracked(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_counts_up() {
        let tracker = FloodTracker::new(Duration::from_secs(2));
        let start = Instant::now();

        let counts: Vec<usize> = (0..4)
            .map(|i| tracker.record_and_check(1, 42, start + Duration::from_millis(i * 300)))
            .collect();

        assert_eq!(counts, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_spread_messages_expire() {
        let tracker = FloodTracker::new(Duration::from_secs(2));
        let start = Instant::now();

        for i in 0..4 {
            let count = tracker.record_and_check(1, 42, start + Duration::from_secs(i * 3));
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let tracker = FloodTracker::new(Duration::from_secs(2));
        let start = Instant::now();

        tracker.record_and_check(1, 42, start);
        assert_eq!(tracker.record_and_check(1, 42, start + Duration::from_secs(2)), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = FloodTracker::new(Duration::from_secs(2));
        let now = Instant::now();

        tracker.record_and_check(1, 42, now);
        tracker.record_and_check(1, 42, now);
        assert_eq!(tracker.record_and_check(1, 43, now), 1);
        assert_eq!(tracker.record_and_check(2, 42, now), 1);
        assert_eq!(tracker.tracked(), 3);
    }

    #[test]
    fn test_sweep_removes_idle_authors() {
        let tracker = FloodTracker::new(Duration::from_secs(2));
        let start = Instant::now();

        tracker.record_and_check(1, 1, start);
        tracker.record_and_check(1, 2, start + Duration::from_secs(3));

        assert_eq!(tracker.sweep(start + Duration::from_secs(4)), 1);
        assert_eq!(tracker.tracked(), 1);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let tracker = FloodTracker::new(Duration::from_secs(60));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        tracker.record_and_check(7, 7, now);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.record_and_check(7, 7, now), 401);
    }
}
