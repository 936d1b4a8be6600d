// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! `taiclockd`: serve TAICLOCK time over UDP.
//!
//! Run with:
//!   RUST_LOG=info taiclockd -d /etc/taiclockd
//!
//! The ACL directory may hold a `port` file and address marker files. Without
//! it every source is answered on port 4014.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tai_server::server::TaiServer;
use tai_server::server_common::ServerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Exit status for configuration and bind failures.
const EXIT_STARTUP_FAILURE: u8 = 111;

/// TAICLOCK time server.
#[derive(Debug, Parser)]
#[command(name = "taiclockd", version, about)]
struct Args {
    /// Directory holding the `port` file and ACL marker files.
    #[arg(short = 'd', long = "acl-dir", value_name = "DIR")]
    acl_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    let config = ServerConfig {
        acl_dir: args.acl_dir,
        ..ServerConfig::default()
    };

    let server = match TaiServer::builder().config(config).build().await {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                signal.cancel();
            }
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    match server.run(shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
