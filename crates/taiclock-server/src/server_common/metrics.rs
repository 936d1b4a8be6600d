// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Lock-free server metrics using atomic counters.
//!
//! All counters use relaxed ordering; a snapshot taken while traffic is
//! flowing is approximate.

use std::sync::atomic::{AtomicU64, Ordering};

/// Runtime server metrics, updated on every datagram.
///
/// Pass a shared instance to
/// [`TaiServerBuilder::metrics()`](crate::server::TaiServerBuilder::metrics)
/// to read counters from another task, or use
/// [`TaiServer::metrics()`](crate::server::TaiServer::metrics).
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> std::io::Result<()> {
/// use std::sync::Arc;
/// use tai_server::server::TaiServer;
/// use tai_server::server_common::ServerMetrics;
///
/// let metrics = Arc::new(ServerMetrics::new());
/// let server = TaiServer::builder()
///     .listen("127.0.0.1:4014".parse().unwrap())
///     .metrics(metrics.clone())
///     .build()
///     .await?;
///
/// let snap = metrics.snapshot();
/// println!("datagrams: {}", snap.requests_received);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ServerMetrics {
    /// Datagrams received (valid or not).
    pub requests_received: AtomicU64,
    /// Datagrams dropped by the rate limiter.
    pub rate_limited: AtomicU64,
    /// Datagrams dropped by validation (size, magic, or ACL).
    pub rejected: AtomicU64,
    /// Valid requests dropped because every response token was taken.
    pub shed: AtomicU64,
    /// Responses sent.
    pub responses_sent: AtomicU64,
    /// Response tasks abandoned at their deadline.
    pub responses_timed_out: AtomicU64,
    /// Sources in the rate-limit table at the last janitor sweep.
    pub active_sources: AtomicU64,
}

impl ServerMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a point-in-time snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            shed: self.shed.load(Ordering::Relaxed),
            responses_sent: self.responses_sent.load(Ordering::Relaxed),
            responses_timed_out: self.responses_timed_out.load(Ordering::Relaxed),
            active_sources: self.active_sources.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub(crate) fn inc_requests_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_shed(&self) {
        self.shed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_responses_sent(&self) {
        self.responses_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_responses_timed_out(&self) {
        self.responses_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn set_active_sources(&self, count: u64) {
        self.active_sources.store(count, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of server metrics.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsSnapshot {
    /// Datagrams received (valid or not).
    pub requests_received: u64,
    /// Datagrams dropped by the rate limiter.
    pub rate_limited: u64,
    /// Datagrams dropped by validation.
    pub rejected: u64,
    /// Valid requests dropped for lack of a response token.
    pub shed: u64,
    /// Responses sent.
    pub responses_sent: u64,
    /// Response tasks abandoned at their deadline.
    pub responses_timed_out: u64,
    /// Sources in the rate-limit table.
    pub active_sources: u64,
}
