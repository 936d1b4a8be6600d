// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

use std::net::IpAddr;

use tai_proto::protocol;
use tai_proto::tai64::Tain;

use super::AccessControl;

/// Decides whether a datagram deserves a response.
///
/// Called on the receive loop after rate limiting and the size check, so
/// implementations must not block.
pub trait RequestValidator: Send + Sync + 'static {
    /// Return `true` to answer `request` from `source`.
    fn validate(&self, request: &[u8], source: IpAddr) -> bool;
}

/// Builds the reply to a validated datagram.
///
/// Runs inside an admitted response task under the response deadline.
pub trait ResponseHandler: Send + Sync + 'static {
    /// Return the bytes to send back, or `None` to send nothing.
    fn respond(&self, request: &[u8], source: IpAddr) -> Option<Vec<u8>>;
}

/// The TAICLOCK request validator and response handler.
#[derive(Clone, Debug, Default)]
pub struct TaiClockProtocol {
    access: AccessControl,
}

impl TaiClockProtocol {
    /// Create the protocol handler, authorizing sources through `access`.
    pub fn new(access: AccessControl) -> Self {
        TaiClockProtocol { access }
    }
}

impl RequestValidator for TaiClockProtocol {
    fn validate(&self, request: &[u8], source: IpAddr) -> bool {
        request.len() >= protocol::MIN_REQUEST_LEN
            && protocol::has_magic(request)
            && self.access.is_authorized(source)
    }
}

impl ResponseHandler for TaiClockProtocol {
    fn respond(&self, request: &[u8], _source: IpAddr) -> Option<Vec<u8>> {
        protocol::build_response(request, Tain::now()).map(|resp| resp.to_vec())
    }
}
