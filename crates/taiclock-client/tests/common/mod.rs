// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Scripted UDP responders for client tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tai_client::protocol;
use tai_client::tai64::Tain;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// How a responder treats each request it receives.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// Answer every request with the fixed time.
    Answer,
    /// Ignore the first `n` requests, then answer.
    DropFirst(usize),
    /// Hold the first answer back for the given time, answer the rest at once.
    DelayFirst(Duration),
    /// Answer with the echoed tail corrupted.
    BadEcho,
    /// Never answer.
    Silent,
}

/// A responder bound to an ephemeral loopback port.
pub struct Responder {
    pub addr: SocketAddr,
    pub handle: JoinHandle<()>,
}

impl Drop for Responder {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn a responder that stamps every answer with `time`.
pub async fn spawn_responder(time: Tain, behavior: Behavior) -> Responder {
    let sock = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
    let addr = sock.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let mut seen = 0usize;
        loop {
            let Ok((len, src)) = sock.recv_from(&mut buf).await else {
                return;
            };
            seen += 1;
            let Some(mut resp) = protocol::build_response(&buf[..len], time) else {
                continue;
            };
            match behavior {
                Behavior::Answer => {}
                Behavior::DropFirst(n) if seen <= n => continue,
                Behavior::DropFirst(_) => {}
                Behavior::DelayFirst(delay) if seen == 1 => {
                    let sock = Arc::clone(&sock);
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = sock.send_to(&resp, src).await;
                    });
                    continue;
                }
                Behavior::DelayFirst(_) => {}
                Behavior::BadEcho => resp[protocol::ECHO_OFFSET] ^= 0xFF,
                Behavior::Silent => continue,
            }
            let _ = sock.send_to(&resp, src).await;
        }
    });

    Responder { addr, handle }
}
