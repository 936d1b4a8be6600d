// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! TAICLOCK datagram layout and the byte-level traits used to pack
//! timestamps into it.
//!
//! A request is at least 20 bytes: the magic `"ctai"` followed by 16 bytes
//! the server never interprets. A response is exactly 20 bytes:
//!
//! | Offset | Size | Contents |
//! |--------|------|----------|
//! | 0 | 1 | `'s'` |
//! | 1 | 3 | echoed from the request |
//! | 4 | 8 | TAI seconds, big-endian |
//! | 12 | 4 | nanoseconds, big-endian |
//! | 16 | 4 | echoed from the request |

use crate::error::ParseError;
use crate::tai64::Tain;

/// Default TAICLOCK UDP port.
pub const PORT: u16 = 4014;

/// Magic prefix every request must carry.
pub const MAGIC: [u8; 4] = *b"ctai";

/// First byte of every response.
pub const RESPONSE_MARKER: u8 = b's';

/// Smallest request the server will answer.
pub const MIN_REQUEST_LEN: usize = 20;

/// Exact size of a response.
pub const RESPONSE_LEN: usize = 20;

/// Offset of the packed [`Tain`] inside requests and responses.
pub const TIMESTAMP_OFFSET: usize = 4;

/// Offset of the trailing bytes the server echoes back.
pub const ECHO_OFFSET: usize = 16;

/// Number of random bytes a client appends after its timestamp.
pub const NONCE_LEN: usize = 12;

/// Size of the requests built by [`build_request`].
pub const REQUEST_LEN: usize = TIMESTAMP_OFFSET + 12 + NONCE_LEN;

mod bytes;
mod traits;

pub use self::traits::*;

/// Return `true` if `buf` starts with the request magic.
pub fn has_magic(buf: &[u8]) -> bool {
    buf.len() >= MAGIC.len() && buf[..MAGIC.len()] == MAGIC
}

/// Build a client request carrying the local send time and a nonce.
///
/// The first four nonce bytes land at offsets 16..20 and come back in the
/// response, which lets a client match replies to requests.
pub fn build_request(now: Tain, nonce: [u8; NONCE_LEN]) -> [u8; REQUEST_LEN] {
    let mut buf = [0u8; REQUEST_LEN];
    buf[..4].copy_from_slice(&MAGIC);
    buf[TIMESTAMP_OFFSET..ECHO_OFFSET].copy_from_slice(&now.pack());
    buf[ECHO_OFFSET..].copy_from_slice(&nonce);
    buf
}

/// Build the 20-byte response to `request`, stamped with `now`.
///
/// Bytes 1..4 and 16..20 are copied from the request unchanged. Returns
/// `None` if the request is shorter than [`MIN_REQUEST_LEN`]; the magic is
/// not re-checked here.
pub fn build_response(request: &[u8], now: Tain) -> Option<[u8; RESPONSE_LEN]> {
    if request.len() < MIN_REQUEST_LEN {
        return None;
    }
    let mut buf = [0u8; RESPONSE_LEN];
    buf.copy_from_slice(&request[..RESPONSE_LEN]);
    buf[0] = RESPONSE_MARKER;
    buf[TIMESTAMP_OFFSET..ECHO_OFFSET].copy_from_slice(&now.pack());
    Some(buf)
}

/// Decode the server timestamp from a response.
pub fn parse_response(buf: &[u8]) -> Result<Tain, ParseError> {
    if buf.len() < RESPONSE_LEN {
        return Err(ParseError::BufferTooShort {
            needed: RESPONSE_LEN,
            available: buf.len(),
        });
    }
    if buf[0] != RESPONSE_MARKER {
        return Err(ParseError::InvalidField {
            field: "response marker",
            value: buf[0] as u32,
        });
    }
    let (tain, _) = Tain::from_bytes(&buf[TIMESTAMP_OFFSET..ECHO_OFFSET])?;
    Ok(tain)
}

/// Return the four bytes a response echoes at offsets 16..20.
pub fn echoed_tail(buf: &[u8]) -> Option<[u8; 4]> {
    buf.get(ECHO_OFFSET..ECHO_OFFSET + 4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
}
