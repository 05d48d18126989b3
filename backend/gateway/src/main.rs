//! SimpleStorage chain gateway — entry point.
//!
//! Exposes a small Axum REST API mirroring the contract's on-chain
//! state: current stored value, owner, and recent event history. Every
//! endpoint is a live read against the node; nothing is cached or
//! persisted. Writes are client-signed only (see the `set-value`
//! binary), so no write route exists here.

use std::sync::Arc;

use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chain_gateway::api::{self, ApiState};
use chain_gateway::chain::ChainReader;
use chain_gateway::config::Config;
use chain_gateway::events::EventFetcher;
use chain_gateway::rpc::{EthRpcClient, NodeClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let node: Arc<dyn NodeClient> = Arc::new(EthRpcClient::new(client, config.rpc_url.clone()));

    let state = Arc::new(ApiState {
        reader: ChainReader::new(node.clone(), config.contract_address),
        fetcher: EventFetcher::new(node, config.contract_address, config.event_window_blocks),
    });

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!(
        "API listening on http://{addr} — contract {:#x} via {}",
        config.contract_address, config.rpc_url
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
