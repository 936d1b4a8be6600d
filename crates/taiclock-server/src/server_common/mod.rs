// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Building blocks of the TAICLOCK server runtime.
//!
//! Each piece is usable and testable on its own: filesystem access control,
//! the per-source rate limiter and its janitor, the response admission pool,
//! the address-string cache, metrics, and the validator/handler traits that
//! keep [`crate::server`] independent of the wire protocol.

mod access_control;
mod address_cache;
mod admission;
mod config;
mod handler;
mod metrics;
mod rate_limit;

pub use self::access_control::{ALLOW_ALL_MARKER, AccessControl, PORT_FILE};
pub use self::address_cache::{AddressCache, DEFAULT_ADDRESS_CACHE_CAPACITY};
pub use self::admission::ResponseAdmission;
pub use self::config::{
    DEFAULT_MAX_CONCURRENT_RESPONSES, DEFAULT_MAX_REQUEST_BYTES, DEFAULT_MAX_REQUESTS_PER_SOURCE,
    DEFAULT_RATE_LIMIT_WINDOW, DEFAULT_READ_TIMEOUT, DEFAULT_RESPONSE_TIMEOUT, ServerConfig,
};
pub use self::handler::{RequestValidator, ResponseHandler, TaiClockProtocol};
pub use self::metrics::{MetricsSnapshot, ServerMetrics};
pub use self::rate_limit::{Clock, RateLimitEntry, RateLimiter, TokioClock};
