// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::ServerMetrics;

/// Source of the current time for the rate limiter.
pub trait Clock: Send + Sync + 'static {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by the tokio timer, so paused-time tests can drive it.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Per-source state for the current window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RateLimitEntry {
    /// Requests counted in the current window.
    pub count: u32,
    /// When the current window began.
    pub window_start: Instant,
}

/// Per-source fixed-window request counter.
///
/// All entries live in one table behind one mutex; every lookup and update
/// happens inside a single short critical section.
#[derive(Debug)]
pub struct RateLimiter<C: Clock = TokioClock> {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    max_requests: u32,
    window: Duration,
    clock: C,
}

impl RateLimiter<TokioClock> {
    /// Create a limiter allowing `max_requests` per `window` for each source.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        RateLimiter::with_clock(max_requests, window, TokioClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a limiter that reads time from `clock`.
    pub fn with_clock(max_requests: u32, window: Duration, clock: C) -> Self {
        RateLimiter {
            entries: Mutex::new(HashMap::new()),
            max_requests,
            window,
            clock,
        }
    }

    /// The rate-limit window.
    pub fn window(&self) -> Duration {
        self.window
    }

    // Every mutation leaves the table consistent, so a poisoned lock is safe
    // to keep using.
    fn table(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count one request from `source_key` and report whether it may proceed.
    ///
    /// A rejected request does not touch the entry, so a source that keeps
    /// sending is released as soon as its window expires.
    pub fn allow(&self, source_key: &str) -> bool {
        let now = self.clock.now();
        let mut table = self.table();
        if let Some(entry) = table.get_mut(source_key) {
            if now.duration_since(entry.window_start) > self.window {
                entry.count = 1;
                entry.window_start = now;
                return true;
            }
            if entry.count < self.max_requests {
                entry.count += 1;
                return true;
            }
            return false;
        }
        table.insert(
            source_key.to_owned(),
            RateLimitEntry {
                count: 1,
                window_start: now,
            },
        );
        true
    }

    /// Remove entries whose window started more than two windows ago.
    /// Returns the number removed.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now();
        let horizon = self.window * 2;
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, entry| now.duration_since(entry.window_start) <= horizon);
        before - table.len()
    }

    /// Number of tracked sources.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Whether no source is tracked.
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Snapshot of one source's entry.
    pub fn entry(&self, source_key: &str) -> Option<RateLimitEntry> {
        self.table().get(source_key).copied()
    }

    /// Spawn the janitor: every two windows, evict stale entries and publish
    /// the table size to `metrics`. Stops when `shutdown` is cancelled.
    pub fn spawn_janitor(
        limiter: Arc<Self>,
        metrics: Arc<ServerMetrics>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = limiter.window * 2;
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = limiter.evict_stale();
                        let active = limiter.len();
                        metrics.set_active_sources(active as u64);
                        if removed > 0 {
                            trace!(removed, active, "evicted stale rate-limit entries");
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Manually advanced clock.
    struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        fn new() -> Self {
            ManualClock(Mutex::new(Instant::now()))
        }
    }

    impl Clock for Arc<ManualClock> {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    fn advance(clock: &ManualClock, by: Duration) {
        *clock.0.lock().unwrap() += by;
    }

    fn limiter(max: u32) -> (Arc<ManualClock>, RateLimiter<Arc<ManualClock>>) {
        let clock = Arc::new(ManualClock::new());
        let rl = RateLimiter::with_clock(max, Duration::from_secs(1), Arc::clone(&clock));
        (clock, rl)
    }

    #[test]
    fn test_allows_up_to_limit_then_rejects() {
        let (_clock, rl) = limiter(3);
        assert!(rl.allow("10.0.0.1"));
        assert!(rl.allow("10.0.0.1"));
        assert!(rl.allow("10.0.0.1"));
        assert!(!rl.allow("10.0.0.1"));
        assert!(!rl.allow("10.0.0.1"));
    }

    #[test]
    fn test_window_expiry_resets() {
        let (clock, rl) = limiter(3);
        for _ in 0..3 {
            assert!(rl.allow("a"));
        }
        assert!(!rl.allow("a"));
        advance(&clock, Duration::from_millis(1_001));
        assert!(rl.allow("a"));
        assert_eq!(rl.entry("a").map(|e| e.count), Some(1));
    }

    #[test]
    fn test_window_edge_is_still_inside() {
        let (clock, rl) = limiter(1);
        assert!(rl.allow("a"));
        advance(&clock, Duration::from_secs(1));
        assert!(!rl.allow("a"));
    }

    #[test]
    fn test_rejection_does_not_mutate() {
        let (_clock, rl) = limiter(2);
        rl.allow("a");
        rl.allow("a");
        let before = rl.entry("a");
        assert!(!rl.allow("a"));
        assert_eq!(rl.entry("a"), before);
    }

    #[test]
    fn test_sources_are_independent() {
        let (_clock, rl) = limiter(1);
        assert!(rl.allow("a"));
        assert!(!rl.allow("a"));
        assert!(rl.allow("b"));
        assert_eq!(rl.len(), 2);
    }

    #[test]
    fn test_evict_stale() {
        let (clock, rl) = limiter(5);
        rl.allow("old");
        advance(&clock, Duration::from_millis(1_500));
        rl.allow("new");
        advance(&clock, Duration::from_millis(600));
        assert_eq!(rl.evict_stale(), 1);
        assert!(rl.entry("old").is_none());
        assert!(rl.entry("new").is_some());
    }

    #[test]
    fn test_poisoned_lock_recovers() {
        let (_clock, rl) = limiter(2);
        let rl = Arc::new(rl);
        let poisoner = Arc::clone(&rl);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the table");
        })
        .join();
        assert!(rl.entries.is_poisoned());
        assert!(rl.allow("a"));
        assert_eq!(rl.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_janitor_evicts_and_stops() {
        let rl = Arc::new(RateLimiter::new(5, Duration::from_secs(1)));
        let metrics = Arc::new(ServerMetrics::new());
        let shutdown = CancellationToken::new();
        rl.allow("a");
        metrics.set_active_sources(1);

        let handle =
            RateLimiter::spawn_janitor(Arc::clone(&rl), Arc::clone(&metrics), shutdown.clone());

        // First sweep at 2s sees an entry exactly two windows old and keeps it.
        tokio::time::sleep(Duration::from_millis(2_100)).await;
        assert_eq!(rl.len(), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rl.is_empty());
        assert_eq!(metrics.snapshot().active_sources, 0);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("janitor did not stop")
            .unwrap();
    }
}
