//! Write client: submit a `setValue` transaction through a node-managed
//! account and follow it to a terminal state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use primitive_types::U256;
use reqwest::Client;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chain_gateway::chain::ChainReader;
use chain_gateway::config::Config;
use chain_gateway::rpc::{EthRpcClient, NodeClient};
use chain_gateway::tx::{SubmitOutcome, TxLifecycle};
use chain_gateway::wallet::NodeWallet;

#[derive(Parser)]
#[command(about = "Store a new value in the SimpleStorage contract")]
struct Args {
    /// New value to store (decimal uint256)
    value: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let value = U256::from_dec_str(&args.value).context("value must be a decimal uint256")?;
    let config = Config::from_env()?;

    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let node: Arc<dyn NodeClient> = Arc::new(EthRpcClient::new(client, config.rpc_url.clone()));

    let lifecycle = Arc::new(TxLifecycle::new(
        ChainReader::new(node.clone(), config.contract_address),
        Arc::new(NodeWallet::new(node.clone())),
        config.chain_id,
        Duration::from_secs(config.confirmation_timeout_secs),
        Duration::from_secs(config.receipt_poll_interval_secs),
    ));

    // The node's chain is the network our node-managed account signs on.
    let wallet_chain_id = node.chain_id().await?;

    let mut transitions = lifecycle.subscribe();
    tokio::spawn(async move {
        while transitions.changed().await.is_ok() {
            if let Some(record) = *transitions.borrow_and_update() {
                info!(status = ?record.status, hash = ?record.hash, "transaction state");
            }
        }
    });

    match lifecycle.submit(value, wallet_chain_id).await? {
        SubmitOutcome::Confirmed { hash, snapshot } => {
            info!(
                hash = ?hash,
                value = %snapshot.value,
                block = snapshot.block_number,
                "value stored and reconciled"
            );
        }
        SubmitOutcome::Detached { hash } => {
            info!(hash = ?hash, "stopped tracking; check a later snapshot");
        }
    }

    Ok(())
}
