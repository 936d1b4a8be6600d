// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! TAICLOCK server using the Tokio runtime.
//!
//! # Architecture
//!
//! One receive loop reads datagrams in arrival order. For each datagram it
//! runs, cheapest first: the per-source [`RateLimiter`], the size bounds, the
//! [`RequestValidator`] (magic and ACL for TAICLOCK), and finally admission
//! into the [`ResponseAdmission`] pool. Admitted requests are answered by an
//! independent task, so responses may leave out of order. The rate-limit
//! janitor runs alongside the loop, and one [`CancellationToken`] stops both.
//!
//! Each receive is bounded by `read_timeout`; a timeout just restarts the
//! loop. Receive errors are logged and never end the loop.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> std::io::Result<()> {
//! use tai_server::server::TaiServer;
//! use tokio_util::sync::CancellationToken;
//!
//! let server = TaiServer::builder()
//!     .listen("[::]:4014".parse().unwrap())
//!     .build()
//!     .await?;
//!
//! let shutdown = CancellationToken::new();
//! let stop = shutdown.clone();
//! tokio::spawn(async move {
//!     let _ = tokio::signal::ctrl_c().await;
//!     stop.cancel();
//! });
//! server.run(shutdown).await
//! # }
//! ```

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::{ConfigError, TaiServerError};
use crate::protocol;
use crate::server_common::{
    AccessControl, AddressCache, RateLimiter, RequestValidator, ResponseAdmission,
    ResponseHandler, ServerConfig, ServerMetrics, TaiClockProtocol,
};

/// Builder for configuring and creating a [`TaiServer`].
#[derive(Default)]
pub struct TaiServerBuilder {
    config: ServerConfig,
    listen_addr: Option<SocketAddr>,
    metrics: Option<Arc<ServerMetrics>>,
    validator: Option<Arc<dyn RequestValidator>>,
    handler: Option<Arc<dyn ResponseHandler>>,
}

impl TaiServerBuilder {
    /// Replace the whole configuration. Zero fields fall back to defaults.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the ACL directory.
    pub fn acl_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.acl_dir = Some(dir.into());
        self
    }

    /// Bind exactly this address, ignoring `bind_addr`, `default_port`, and
    /// the ACL `port` file.
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = Some(addr);
        self
    }

    /// Attach a shared metrics instance.
    pub fn metrics(mut self, metrics: Arc<ServerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Replace the request validator (default: TAICLOCK magic plus ACL).
    pub fn validator(mut self, validator: Arc<dyn RequestValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replace the response handler (default: TAICLOCK time response).
    pub fn handler(mut self, handler: Arc<dyn ResponseHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validate the configuration and bind the socket.
    ///
    /// Fails with [`TaiServerError::Config`] if the ACL path is not a
    /// directory and [`TaiServerError::Bind`] if the socket cannot be bound,
    /// both wrapped in `io::Error`.
    pub async fn build(self) -> io::Result<TaiServer> {
        let config = Arc::new(self.config.normalized());

        if let Some(dir) = &config.acl_dir
            && !fs::metadata(dir).is_ok_and(|m| m.is_dir())
        {
            return Err(TaiServerError::from(ConfigError::NotADirectory {
                path: dir.display().to_string(),
            })
            .into());
        }
        let access = AccessControl::new(config.acl_dir.clone());

        let addr = self.listen_addr.unwrap_or_else(|| {
            SocketAddr::new(config.bind_addr, access.resolve_port(config.default_port))
        });
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TaiServerError::Bind { addr, source })?;
        let local_addr = socket.local_addr()?;
        info!(%local_addr, acl_dir = ?config.acl_dir, "TAICLOCK server listening");

        let protocol = Arc::new(TaiClockProtocol::new(access));
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::clone(&protocol) as Arc<dyn RequestValidator>);
        let handler = self
            .handler
            .unwrap_or_else(|| protocol as Arc<dyn ResponseHandler>);

        let metrics = self.metrics.unwrap_or_default();
        let limiter = Arc::new(RateLimiter::new(
            config.max_requests_per_source,
            config.rate_limit_window,
        ));
        let admission = ResponseAdmission::new(
            config.max_concurrent_responses,
            config.response_timeout,
            Arc::clone(&metrics),
        );

        Ok(TaiServer {
            socket: Arc::new(socket),
            config,
            limiter,
            admission,
            addresses: AddressCache::default(),
            validator,
            handler,
            metrics,
        })
    }
}

/// A bound TAICLOCK server.
///
/// Created via [`TaiServer::builder()`]. Call [`run()`](TaiServer::run) to
/// start serving.
pub struct TaiServer {
    socket: Arc<UdpSocket>,
    config: Arc<ServerConfig>,
    limiter: Arc<RateLimiter>,
    admission: ResponseAdmission,
    addresses: AddressCache,
    validator: Arc<dyn RequestValidator>,
    handler: Arc<dyn ResponseHandler>,
    metrics: Arc<ServerMetrics>,
}

impl TaiServer {
    /// Create a builder for configuring the server.
    pub fn builder() -> TaiServerBuilder {
        TaiServerBuilder::default()
    }

    /// The local address the server is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// The server's metrics.
    pub fn metrics(&self) -> &Arc<ServerMetrics> {
        &self.metrics
    }

    /// The normalized configuration in use.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve requests until `shutdown` is cancelled.
    ///
    /// Returns once the receive loop and the janitor have stopped. The socket
    /// closes when the last in-flight response task ends, which is bounded by
    /// `response_timeout`.
    pub async fn run(self, shutdown: CancellationToken) -> io::Result<()> {
        let janitor = RateLimiter::spawn_janitor(
            Arc::clone(&self.limiter),
            Arc::clone(&self.metrics),
            shutdown.clone(),
        );

        // One byte past the limit, so an oversized datagram shows up as
        // too long instead of being silently truncated to fit.
        let mut recv_buf = vec![0u8; self.config.max_request_bytes + 1];

        loop {
            let received = tokio::select! {
                _ = shutdown.cancelled() => break,
                r = tokio::time::timeout(
                    self.config.read_timeout,
                    self.socket.recv_from(&mut recv_buf),
                ) => r,
            };
            let (len, peer) = match received {
                Err(_) => continue,
                Ok(Err(e)) => {
                    warn!(error = %e, "receive failed");
                    continue;
                }
                Ok(Ok(datagram)) => datagram,
            };
            self.handle_datagram(&recv_buf[..len], peer);
        }

        if let Err(e) = janitor.await {
            warn!(error = %e, "rate-limit janitor failed");
        }
        info!("TAICLOCK server stopped");
        Ok(())
    }

    fn handle_datagram(&self, request: &[u8], peer: SocketAddr) {
        self.metrics.inc_requests_received();
        let source = peer.ip().to_canonical();

        let key = self.addresses.key_for(source);
        if !self.limiter.allow(&key) {
            self.metrics.inc_rate_limited();
            trace!(%peer, "rate limited");
            return;
        }

        if request.len() < protocol::MIN_REQUEST_LEN
            || request.len() > self.config.max_request_bytes
            || !self.validator.validate(request, source)
        {
            self.metrics.inc_rejected();
            trace!(%peer, len = request.len(), "dropped invalid request");
            return;
        }

        let request = request.to_vec();
        let socket = Arc::clone(&self.socket);
        let handler = Arc::clone(&self.handler);
        let metrics = Arc::clone(&self.metrics);
        let deadline = Instant::now() + self.config.response_timeout;
        let admitted = self.admission.try_spawn(async move {
            let Some(response) = handler.respond(&request, source) else {
                return;
            };
            // The handler is synchronous and cannot be cut off mid-call, so a
            // reply it produced after the deadline is discarded here.
            if Instant::now() >= deadline {
                metrics.inc_responses_timed_out();
                debug!(%peer, "late response discarded");
                return;
            }
            match socket.send_to(&response, peer).await {
                Ok(_) => metrics.inc_responses_sent(),
                Err(e) => trace!(%peer, error = %e, "send failed"),
            }
        });
        if admitted.is_none() {
            self.metrics.inc_shed();
            debug!(%peer, "response pool full, request shed");
        }
    }
}
