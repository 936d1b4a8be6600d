// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for server integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tai_server::protocol;
use tai_server::server::TaiServerBuilder;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A server running in a background task.
pub(crate) struct TestServer {
    pub(crate) addr: SocketAddr,
    pub(crate) shutdown: CancellationToken,
    pub(crate) handle: JoinHandle<std::io::Result<()>>,
}

/// Spawn a test server on an ephemeral loopback port.
///
/// The server stops when `shutdown` is cancelled or the runtime is dropped.
pub(crate) async fn spawn_test_server(builder: TaiServerBuilder) -> TestServer {
    let server = builder
        .listen("127.0.0.1:0".parse().unwrap())
        .build()
        .await
        .expect("failed to bind test server");
    let addr = server.local_addr().expect("failed to get local addr");
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));
    // Small yield to ensure the server task is running.
    tokio::time::sleep(Duration::from_millis(10)).await;
    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// The 20-byte request: magic followed by sixteen zero bytes.
pub(crate) fn zero_request() -> [u8; protocol::MIN_REQUEST_LEN] {
    let mut buf = [0u8; protocol::MIN_REQUEST_LEN];
    buf[..4].copy_from_slice(&protocol::MAGIC);
    buf
}

/// Send a raw UDP packet to `addr` and receive the response with a timeout.
///
/// Returns `None` if the server doesn't respond within the timeout.
pub(crate) async fn send_receive_raw(
    addr: SocketAddr,
    packet: &[u8],
    timeout: Duration,
) -> Option<Vec<u8>> {
    let sock = UdpSocket::bind("127.0.0.1:0").await.expect("bind failed");
    send_receive_on(&sock, addr, packet, timeout).await
}

/// Like [`send_receive_raw`], reusing `sock` so the source address is stable.
pub(crate) async fn send_receive_on(
    sock: &UdpSocket,
    addr: SocketAddr,
    packet: &[u8],
    timeout: Duration,
) -> Option<Vec<u8>> {
    sock.send_to(packet, addr).await.expect("send failed");
    let mut buf = vec![0u8; 2048];
    match tokio::time::timeout(timeout, sock.recv_from(&mut buf)).await {
        Ok(Ok((len, _))) => {
            buf.truncate(len);
            Some(buf)
        }
        _ => None,
    }
}
