// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! `taiclock`: print a TAICLOCK server's delay-corrected time.
//!
//! Run with:
//!   RUST_LOG=debug taiclock 192.0.2.1

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::time::Duration;

use chrono::SecondsFormat;
use clap::Parser;
use log::error;
use tai_client::ClockProbe;
use tai_client::probe::DEFAULT_PROBE_COUNT;
use tai_client::protocol;

/// Query a TAICLOCK server.
#[derive(Debug, Parser)]
#[command(name = "taiclock", version, about)]
struct Args {
    /// Server IP address.
    server: IpAddr,
    /// Server UDP port.
    #[arg(long, default_value_t = protocol::PORT)]
    port: u16,
    /// How long to wait for each reply, in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 1000)]
    timeout_ms: u64,
    /// Number of round-trip probes before the final query.
    #[arg(long, default_value_t = DEFAULT_PROBE_COUNT)]
    probes: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let probe = ClockProbe::new(SocketAddr::new(args.server, args.port))
        .probe_count(args.probes)
        .recv_timeout(Duration::from_millis(args.timeout_ms));

    match probe.run().await {
        Ok(result) => {
            println!("{}", result.corrected_time);
            if let Some(utc) = result.corrected_time.to_calendar() {
                println!("{}", utc.to_rfc3339_opts(SecondsFormat::Nanos, true));
            }
            println!(
                "one-way delay {:?} ({}/{} probes answered)",
                result.one_way_delay, result.successful_probes, result.probe_count
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}: {e}", args.server);
            ExitCode::FAILURE
        }
    }
}
