// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! TAICLOCK UDP time server.
//!
//! Answers 20-byte TAICLOCK requests with the current TAI64N time while
//! staying bounded under hostile load: every datagram is rate limited per
//! source before anything else, validated against the wire format and a
//! filesystem ACL, and answered from a fixed-size pool of response tasks
//! that each run under a deadline. Nothing is sent for a dropped datagram.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `ipv4` | no | Default to `0.0.0.0` instead of `[::]` for the bind address. |
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! use tai_server::server::TaiServer;
//! use tai_server::server_common::ServerConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let server = TaiServer::builder()
//!     .config(ServerConfig {
//!         acl_dir: Some("/etc/taiclockd".into()),
//!         ..ServerConfig::default()
//!     })
//!     .build()
//!     .await?;
//!
//! server.run(CancellationToken::new()).await
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::net::IpAddr;

pub use tai_proto::{protocol, tai64};

pub mod error;
pub mod server;
pub mod server_common;

/// Default bind address based on the `ipv4` feature flag.
///
/// Without `ipv4`: `[::]` (dual-stack). With `ipv4`: `0.0.0.0`.
pub(crate) fn default_bind_addr() -> IpAddr {
    #[cfg(not(feature = "ipv4"))]
    {
        IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
    }
    #[cfg(feature = "ipv4")]
    {
        IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
    }
}
