//! Micropayment-gated demo HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (sample recipient, public facilitator, port 3000)
//! cargo run -p tollbooth-server
//!
//! # Point payments at your own address
//! RECIPIENT_ADDRESS=YourSolanaAddress cargo run -p tollbooth-server
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p tollbooth-server
//! ```
//!
//! # Environment Variables
//!
//! - `RECIPIENT_ADDRESS` — Payee account for gated routes (default: sample devnet address)
//! - `FACILITATOR_URL` — x402 facilitator base URL (default: `https://x402.org/facilitator`)
//! - `PORT` — TCP port to listen on (default: `3000`)
//! - `RUST_LOG` — Log level filter (default: `info`)

use std::net::{Ipv4Addr, SocketAddr};

use tollbooth::client::HttpFacilitator;
use tollbooth_server::config::ServerConfig;
use tollbooth_server::{app, price_table};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // .env is optional; a missing file is not an error
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    tracing::info!(
        recipient = %config.recipient.as_str(),
        network = %config.network,
        facilitator = %config.facilitator_url,
        port = config.port,
        "Loaded configuration"
    );
    if config.recipient_is_default {
        tracing::warn!(
            "RECIPIENT_ADDRESS not set — demo payments go to the built-in sample address"
        );
    }

    let facilitator = HttpFacilitator::try_new(config.facilitator_url.clone())?;
    let prices = price_table(&config)?;
    for entry in prices.entries() {
        tracing::info!(
            resource = entry.route.path(),
            amount = %entry.tag.amount,
            "Gated route priced"
        );
    }

    let app = app(facilitator, prices);

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
