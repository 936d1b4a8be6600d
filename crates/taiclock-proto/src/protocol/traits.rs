// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;

/// Types that have a constant size when written to or read from bytes.
pub trait ConstPackedSizeBytes {
    /// The constant size in bytes when this type is packed for network transmission.
    const PACKED_SIZE_BYTES: usize;
}

/// Parse a type from a byte slice, returning the parsed value and the number
/// of bytes consumed.
///
/// Operates directly on `&[u8]` slices so it can be applied to a datagram
/// buffer at any offset without copying.
pub trait FromBytes: Sized {
    /// Parse from the given byte slice. Returns the parsed value and the
    /// number of bytes consumed from the front of `buf`.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError>;
}

/// Fail with [`ParseError::BufferTooShort`] unless `buf` holds at least
/// `T::PACKED_SIZE_BYTES`.
pub(crate) fn ensure_len<T: ConstPackedSizeBytes>(available: usize) -> Result<(), ParseError> {
    if available < T::PACKED_SIZE_BYTES {
        return Err(ParseError::BufferTooShort {
            needed: T::PACKED_SIZE_BYTES,
            available,
        });
    }
    Ok(())
}
