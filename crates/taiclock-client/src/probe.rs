// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Round-trip probing and delay-corrected server time.
//!
//! A [`ClockProbe`] sends a series of requests over one UDP socket, sums the
//! measured round trips, and converts the sum to an average one-way delay:
//!
//! ```text
//! one_way_delay = sum(round_trip) / (2 * probe_count)
//! ```
//!
//! The divisor is the configured probe count, so a failed probe counts as a
//! zero-length round trip rather than shrinking the divisor. A final query
//! then fetches the server's time, and the corrected time is that value plus
//! the one-way delay.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use log::{debug, warn};
use tai_proto::protocol;
use tai_proto::tai64::Tain;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::{ProtocolError, TaiClientError};

/// Number of round-trip probes taken before the final query.
pub const DEFAULT_PROBE_COUNT: u32 = 10;

/// Default wait for each reply.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of a probe run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProbeResult {
    /// Time reported by the server in the final query.
    pub server_time: Tain,
    /// Average one-way delay derived from the probes.
    pub one_way_delay: Duration,
    /// `server_time + one_way_delay`.
    pub corrected_time: Tain,
    /// Probes that received a valid reply.
    pub successful_probes: u32,
    /// Probes attempted.
    pub probe_count: u32,
}

/// One successful request/response exchange.
#[derive(Clone, Copy, Debug)]
struct Exchange {
    server_time: Tain,
    round_trip: Duration,
}

/// Client that measures path delay to a TAICLOCK server and reads its time.
#[derive(Clone, Debug)]
pub struct ClockProbe {
    server: SocketAddr,
    probe_count: u32,
    recv_timeout: Duration,
}

impl ClockProbe {
    /// Probe `server` with the default probe count and receive timeout.
    pub fn new(server: SocketAddr) -> Self {
        ClockProbe {
            server,
            probe_count: DEFAULT_PROBE_COUNT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }

    /// Set the number of round-trip probes.
    pub fn probe_count(mut self, count: u32) -> Self {
        self.probe_count = count;
        self
    }

    /// Set how long to wait for each reply.
    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = timeout;
        self
    }

    /// Run the probes and the final query.
    ///
    /// Failed probes are logged and skipped. Only a failure of the final
    /// query, or of binding the socket, is returned as an error. A reply that
    /// misses its own timeout is ignored when it turns up later.
    pub async fn run(&self) -> io::Result<ProbeResult> {
        let sock = UdpSocket::bind(bind_addr_for(&self.server)).await?;
        debug!("{:?}", sock.local_addr());

        let mut total = Duration::ZERO;
        let mut successful = 0;
        for n in 1..=self.probe_count {
            match self.exchange(&sock).await {
                Ok(ex) => {
                    debug!("probe {n}: round trip {:?}", ex.round_trip);
                    total += ex.round_trip;
                    successful += 1;
                }
                Err(e) => warn!("probe {n} to {} failed: {e}", self.server),
            }
        }

        let one_way_delay = average_one_way_delay(total, self.probe_count);
        let last = self.exchange(&sock).await?;
        let corrected_time = last
            .server_time
            .checked_add(one_way_delay)
            .ok_or(TaiClientError::Protocol(ProtocolError::TimeOverflow))?;

        debug!(
            "server {} time {} one-way delay {:?} ({successful}/{} probes)",
            self.server, last.server_time, one_way_delay, self.probe_count
        );
        Ok(ProbeResult {
            server_time: last.server_time,
            one_way_delay,
            corrected_time,
            successful_probes: successful,
            probe_count: self.probe_count,
        })
    }

    /// Send one request and wait for its reply.
    ///
    /// Datagrams from other sources, and late replies to earlier requests,
    /// are discarded while waiting; one deadline covers the whole wait.
    async fn exchange(&self, sock: &UdpSocket) -> Result<Exchange, TaiClientError> {
        let mut nonce = [0u8; protocol::NONCE_LEN];
        rand::fill(&mut nonce);

        let sent_at = Tain::now();
        let request = protocol::build_request(sent_at, nonce);
        sock.send_to(&request, self.server).await?;

        let deadline = Instant::now() + self.recv_timeout;
        let mut buf = [0u8; 64];
        loop {
            let (len, src) = tokio::time::timeout_at(deadline, sock.recv_from(&mut buf))
                .await
                .map_err(|_| TaiClientError::Timeout(self.recv_timeout))??;
            let received_at = Tain::now();

            match validate_reply(&buf[..len], src, self.server, &nonce) {
                Ok(server_time) => {
                    return Ok(Exchange {
                        server_time,
                        round_trip: received_at.duration_since(sent_at).unwrap_or_default(),
                    });
                }
                Err(e @ (ProtocolError::UnexpectedSource | ProtocolError::EchoMismatch)) => {
                    debug!("discarding datagram from {src}: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Convert summed round trips into an average one-way delay.
///
/// Returns zero when `probe_count` is zero.
pub fn average_one_way_delay(total_round_trip: Duration, probe_count: u32) -> Duration {
    match probe_count.checked_mul(2) {
        Some(0) | None => Duration::ZERO,
        Some(divisor) => total_round_trip / divisor,
    }
}

/// Check a reply from `src` against the request sent to `server` with
/// `nonce`, returning the server's timestamp.
pub fn validate_reply(
    buf: &[u8],
    src: SocketAddr,
    server: SocketAddr,
    nonce: &[u8; protocol::NONCE_LEN],
) -> Result<Tain, ProtocolError> {
    if src.ip().to_canonical() != server.ip().to_canonical() {
        return Err(ProtocolError::UnexpectedSource);
    }
    if buf.len() < protocol::RESPONSE_LEN {
        return Err(ProtocolError::ResponseTooShort {
            received: buf.len(),
        });
    }
    if buf[0] != protocol::RESPONSE_MARKER {
        return Err(ProtocolError::UnexpectedMarker { marker: buf[0] });
    }
    if protocol::echoed_tail(buf).as_ref().map(|t| &t[..]) != Some(&nonce[..4]) {
        return Err(ProtocolError::EchoMismatch);
    }
    protocol::parse_response(buf).map_err(ProtocolError::InvalidTimestamp)
}

/// Select the unspecified bind address matching the server's family.
fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}
