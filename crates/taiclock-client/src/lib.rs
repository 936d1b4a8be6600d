// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! TAICLOCK client.
//!
//! Measures the round-trip delay to a TAICLOCK server and returns the
//! server's TAI64N time corrected by the average one-way delay.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! use tai_client::ClockProbe;
//!
//! let result = ClockProbe::new("192.0.2.1:4014".parse().unwrap())
//!     .run()
//!     .await?;
//! println!("{} ({:?} one-way)", result.corrected_time, result.one_way_delay);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use tai_proto::{protocol, tai64};

pub mod error;
pub mod probe;

pub use probe::{ClockProbe, ProbeResult};
