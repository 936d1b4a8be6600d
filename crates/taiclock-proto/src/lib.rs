// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
TAI64/TAI64N timestamp codec and TAICLOCK wire format.

This crate holds everything the TAICLOCK server and client must agree on
bit-for-bit: the fixed-point atomic timestamps ([`tai64::Tai`] and
[`tai64::Tain`]), the historical leap-second table used to move between
UTC and TAI, the `'@'`-prefixed ASCII form, and the 20-byte request/response
layout exchanged over UDP.

# Example

```rust
use tai_proto::protocol;
use tai_proto::tai64::Tain;

let now = Tain::now();
let request = protocol::build_request(now, [0u8; protocol::NONCE_LEN]);
let response = protocol::build_response(&request, now).unwrap();
assert_eq!(protocol::parse_response(&response).unwrap(), now);

let ascii = now.to_string();
assert_eq!(ascii.len(), 25);
assert_eq!(ascii.parse::<Tain>().unwrap(), now);
```
*/

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error types for ASCII decoding and buffer-based parsing.
pub mod error;
/// Historical UTC leap-second table.
pub mod leap;
pub mod protocol;
pub mod tai64;
