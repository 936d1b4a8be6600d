// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for the TAICLOCK client.
//!
//! Public APIs return `io::Result<T>`. Errors are constructed as
//! [`TaiClientError`] variants and converted to `io::Error` via
//! `From<TaiClientError> for io::Error`; downcast through
//! `io::Error::get_ref()` to match on them:
//!
//! ```no_run
//! use tai_client::ClockProbe;
//! use tai_client::error::{ProtocolError, TaiClientError};
//!
//! # async fn example() {
//! let probe = ClockProbe::new("192.0.2.1:4014".parse().unwrap());
//! if let Err(e) = probe.run().await {
//!     match e.get_ref().and_then(|inner| inner.downcast_ref::<TaiClientError>()) {
//!         Some(TaiClientError::Timeout(t)) => eprintln!("no reply within {t:?}"),
//!         Some(TaiClientError::Protocol(ProtocolError::UnexpectedMarker { marker })) => {
//!             eprintln!("server answered with marker {marker:#04x}")
//!         }
//!         _ => eprintln!("probe failed: {e}"),
//!     }
//! }
//! # }
//! ```

pub use tai_proto::error::ParseError;

use std::fmt;
use std::io;
use std::time::Duration;

/// Errors that can occur during a TAICLOCK exchange.
#[derive(Debug)]
pub enum TaiClientError {
    /// The reply was not a valid answer to our request.
    Protocol(ProtocolError),
    /// No reply arrived within the receive timeout.
    Timeout(Duration),
    /// Underlying I/O error (socket bind, send, receive).
    Io(io::Error),
}

/// Reasons a reply is rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// Reply shorter than a TAICLOCK response.
    ResponseTooShort {
        /// Number of bytes received.
        received: usize,
    },
    /// Reply came from an address other than the server's. The probe treats
    /// such a reply as stray and keeps waiting.
    UnexpectedSource,
    /// First byte is not the response marker `'s'`.
    UnexpectedMarker {
        /// The byte received.
        marker: u8,
    },
    /// Bytes 16..20 do not echo our request. The probe treats such a reply as
    /// stray and keeps waiting.
    EchoMismatch,
    /// The timestamp field could not be decoded.
    InvalidTimestamp(ParseError),
    /// The corrected time does not fit in a TAI64N label.
    TimeOverflow,
}

impl fmt::Display for TaiClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaiClientError::Protocol(e) => write!(f, "TAICLOCK protocol error: {e}"),
            TaiClientError::Timeout(t) => write!(f, "TAICLOCK reply timed out after {t:?}"),
            TaiClientError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ResponseTooShort { received } => {
                write!(f, "response too short ({received} bytes)")
            }
            ProtocolError::UnexpectedSource => write!(f, "response from unexpected source address"),
            ProtocolError::UnexpectedMarker { marker } => {
                write!(f, "unexpected response marker 0x{marker:02x}")
            }
            ProtocolError::EchoMismatch => {
                write!(f, "echoed bytes do not match our request")
            }
            ProtocolError::InvalidTimestamp(e) => write!(f, "invalid server timestamp: {e}"),
            ProtocolError::TimeOverflow => write!(f, "corrected time out of range"),
        }
    }
}

impl std::error::Error for TaiClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaiClientError::Io(e) => Some(e),
            TaiClientError::Protocol(ProtocolError::InvalidTimestamp(e)) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<TaiClientError> for io::Error {
    fn from(err: TaiClientError) -> io::Error {
        let kind = match &err {
            TaiClientError::Protocol(_) => io::ErrorKind::InvalidData,
            TaiClientError::Timeout(_) => io::ErrorKind::TimedOut,
            TaiClientError::Io(e) => e.kind(),
        };
        if let TaiClientError::Io(e) = err {
            return e;
        }
        io::Error::new(kind, err)
    }
}

impl From<io::Error> for TaiClientError {
    fn from(err: io::Error) -> TaiClientError {
        TaiClientError::Io(err)
    }
}

impl From<ProtocolError> for TaiClientError {
    fn from(err: ProtocolError) -> TaiClientError {
        TaiClientError::Protocol(err)
    }
}
