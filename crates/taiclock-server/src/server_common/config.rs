// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Startup configuration for the TAICLOCK server.
//!
//! A [`ServerConfig`] is built once, normalized, wrapped in `Arc`, and then
//! shared read-only by the receive loop, the rate limiter, and the response
//! tasks. Nothing changes it after the server starts.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tai_server::server_common::ServerConfig;
//!
//! let config = ServerConfig {
//!     max_requests_per_source: 10,
//!     rate_limit_window: Duration::ZERO,
//!     ..ServerConfig::default()
//! }
//! .normalized();
//!
//! assert_eq!(config.max_requests_per_source, 10);
//! assert_eq!(config.rate_limit_window, Duration::from_secs(1));
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use tai_proto::protocol;

/// Default number of responses that may be in flight at once.
pub const DEFAULT_MAX_CONCURRENT_RESPONSES: usize = 500;
/// Default upper bound on an accepted request's size.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64;
/// Default number of requests one source may send per window.
pub const DEFAULT_MAX_REQUESTS_PER_SOURCE: u32 = 100;
/// Default rate-limit window.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(1);
/// Default deadline for producing and sending one response.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default bound on a single socket receive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Immutable server configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    /// Address to bind (default `[::]`, or `0.0.0.0` with the `ipv4` feature).
    pub bind_addr: IpAddr,
    /// Port used when no ACL directory is set or its `port` file is unusable.
    pub default_port: u16,
    /// Directory of `port` and address marker files. `None` allows every
    /// source and uses `default_port`.
    pub acl_dir: Option<PathBuf>,
    /// Size of the response token pool.
    pub max_concurrent_responses: usize,
    /// Largest request accepted, in bytes.
    pub max_request_bytes: usize,
    /// Requests one source may send within `rate_limit_window`.
    pub max_requests_per_source: u32,
    /// Length of a rate-limit window. The janitor runs every two windows.
    pub rate_limit_window: Duration,
    /// Deadline for one response task.
    pub response_timeout: Duration,
    /// Upper bound on one receive, so shutdown is noticed promptly.
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: crate::default_bind_addr(),
            default_port: protocol::PORT,
            acl_dir: None,
            max_concurrent_responses: DEFAULT_MAX_CONCURRENT_RESPONSES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            max_requests_per_source: DEFAULT_MAX_REQUESTS_PER_SOURCE,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// Replace every zero numeric field with its default.
    ///
    /// A `max_request_bytes` below the protocol minimum would reject every
    /// request, so it is raised to [`protocol::MIN_REQUEST_LEN`].
    pub fn normalized(mut self) -> Self {
        let defaults = ServerConfig::default();
        if self.default_port == 0 {
            self.default_port = defaults.default_port;
        }
        if self.max_concurrent_responses == 0 {
            self.max_concurrent_responses = defaults.max_concurrent_responses;
        }
        if self.max_request_bytes == 0 {
            self.max_request_bytes = defaults.max_request_bytes;
        }
        self.max_request_bytes = self.max_request_bytes.max(protocol::MIN_REQUEST_LEN);
        if self.max_requests_per_source == 0 {
            self.max_requests_per_source = defaults.max_requests_per_source;
        }
        if self.rate_limit_window.is_zero() {
            self.rate_limit_window = defaults.rate_limit_window;
        }
        if self.response_timeout.is_zero() {
            self.response_timeout = defaults.response_timeout;
        }
        if self.read_timeout.is_zero() {
            self.read_timeout = defaults.read_timeout;
        }
        self
    }
}
