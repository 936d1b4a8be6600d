// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Custom error types for the TAI codec.
//!
//! [`DecodeError`] is returned by the ASCII (`@`-prefixed hex) parsers and
//! [`ParseError`] by the buffer-based binary parsers. Both convert into
//! [`std::io::Error`] so callers working with sockets can use `?` directly.

use std::fmt;
use std::io;

/// Errors produced when decoding the ASCII form of a TAI timestamp.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The label does not begin with `'@'` (or is empty).
    BadPrefix,
    /// The hex payload has the wrong length. Both counts are hex characters.
    BadLength {
        /// Number of hex characters the timestamp form requires.
        expected: usize,
        /// Number of hex characters found after the prefix.
        found: usize,
    },
    /// The payload contains a character that is not a hex digit.
    BadHex,
    /// The nanosecond field is not below one second.
    NanosOutOfRange(u32),
}

/// Errors that can occur during buffer-based parsing of packed timestamps
/// or TAICLOCK datagrams.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The buffer is too short for the expected data.
    BufferTooShort {
        /// Number of bytes needed.
        needed: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// An invalid or unrecognized field value was encountered.
    InvalidField {
        /// Name of the field that was invalid.
        field: &'static str,
        /// The invalid value.
        value: u32,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadPrefix => write!(f, "TAI label does not begin with '@'"),
            DecodeError::BadLength { expected, found } => write!(
                f,
                "TAI label has {found} hex characters, expected {expected}"
            ),
            DecodeError::BadHex => write!(f, "TAI label contains a non-hex character"),
            DecodeError::NanosOutOfRange(n) => {
                write!(f, "TAI label nanoseconds {n} not below one second")
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::BufferTooShort { needed, available } => {
                write!(
                    f,
                    "buffer too short: needed {} bytes, got {}",
                    needed, available
                )
            }
            ParseError::InvalidField { field, value } => {
                write!(f, "invalid {} value: {}", field, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}
impl std::error::Error for ParseError {}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

impl From<ParseError> for io::Error {
    fn from(err: ParseError) -> io::Error {
        let kind = match &err {
            ParseError::BufferTooShort { .. } => io::ErrorKind::UnexpectedEof,
            ParseError::InvalidField { .. } => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_bad_prefix() {
        assert_eq!(
            DecodeError::BadPrefix.to_string(),
            "TAI label does not begin with '@'"
        );
    }

    #[test]
    fn test_display_bad_length() {
        let err = DecodeError::BadLength {
            expected: 24,
            found: 20,
        };
        assert_eq!(
            err.to_string(),
            "TAI label has 20 hex characters, expected 24"
        );
    }

    #[test]
    fn test_display_buffer_too_short() {
        let err = ParseError::BufferTooShort {
            needed: 20,
            available: 10,
        };
        assert_eq!(err.to_string(), "buffer too short: needed 20 bytes, got 10");
    }

    #[test]
    fn test_display_invalid_field() {
        let err = ParseError::InvalidField {
            field: "response marker",
            value: 0x63,
        };
        assert_eq!(err.to_string(), "invalid response marker value: 99");
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = ParseError::BufferTooShort {
            needed: 12,
            available: 0,
        }
        .into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);

        let io_err: io::Error = DecodeError::BadHex.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
        let inner = io_err
            .get_ref()
            .unwrap()
            .downcast_ref::<DecodeError>()
            .unwrap();
        assert_eq!(inner, &DecodeError::BadHex);
    }
}
