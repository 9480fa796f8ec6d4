//! Device Agent
//!
//! Runs on an end-user machine and lets a companion web application confirm
//! that requests come from a known physical device:
//! 1. Derives a stable device ID from host signals at startup
//! 2. Issues short-lived device tokens, rotating them on expiry
//! 3. Answers validation queries from localhost only
//!
//! Usage:
//!   device-agent --port 8181
//!
//! Nothing is persisted. The device ID is recomputed on each start and a fresh
//! token is minted.

use std::{net::Ipv4Addr, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use device_agent::{serve, AppState, DEFAULT_ALLOWED_ORIGIN, DEFAULT_PORT, VERSION};
use device_identity::{DeviceIdentity, TokenManager};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "device-agent")]
#[command(about = "Localhost device identity agent")]
#[command(version)]
struct Args {
    /// Port to listen on (loopback only)
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Origin allowed to call the API from a browser
    #[arg(long, default_value = DEFAULT_ALLOWED_ORIGIN)]
    allowed_origin: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let identity = DeviceIdentity::derive().context("Failed to initialize device")?;
    let tokens = TokenManager::with_system_clock(identity.device_id.clone());
    tokens.mint().await;

    let device_id = identity.device_id.clone();
    let state = Arc::new(
        AppState::new(identity, tokens, &args.allowed_origin)
            .context("Invalid --allowed-origin value")?,
    );

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, args.port))
        .await
        .with_context(|| format!("Failed to bind 127.0.0.1:{}", args.port))?;

    info!("Device Agent v{} starting on port {}", VERSION, args.port);
    info!("Device ID: {}", device_id);
    info!("Only accepting connections from localhost");

    println!("\n========================================");
    println!("  Device Agent Running");
    println!("========================================");
    println!("  Device ID: {}", device_id);
    println!("  Listening: http://127.0.0.1:{}", args.port);
    println!("  Origin:    {}", args.allowed_origin);
    println!("========================================\n");

    serve(listener, state).await.context("HTTP server failed")
}
