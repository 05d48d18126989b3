//! Application configuration loaded from environment variables.

use primitive_types::H160;

use crate::abi;
use crate::errors::{GatewayError, Result};

/// Avalanche Fuji, the only network accepted for writes.
pub const FUJI_CHAIN_ID: u64 = 43113;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fuji C-Chain JSON-RPC endpoint
    pub rpc_url: String,
    /// Deployed SimpleStorage contract address
    pub contract_address: H160,
    /// Port for the REST API server
    pub api_port: u16,
    /// Chain id writes must be signed on
    pub chain_id: u64,
    /// How many trailing blocks to scan for events
    pub event_window_blocks: u64,
    /// Upper bound on waiting for a transaction receipt
    pub confirmation_timeout_secs: u64,
    /// Delay between receipt polls
    pub receipt_poll_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            rpc_url: env_var("RPC_URL")
                .unwrap_or_else(|_| "https://api.avax-test.network/ext/bc/C/rpc".to_string()),
            contract_address: abi::parse_address(&env_var("CONTRACT_ADDRESS").map_err(|_| {
                GatewayError::Config("CONTRACT_ADDRESS environment variable is required".to_string())
            })?)
            .map_err(|_| GatewayError::Config("Invalid CONTRACT_ADDRESS".to_string()))?,
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid API_PORT".to_string()))?,
            chain_id: env_var("CHAIN_ID")
                .unwrap_or_else(|_| FUJI_CHAIN_ID.to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid CHAIN_ID".to_string()))?,
            event_window_blocks: env_var("EVENT_WINDOW_BLOCKS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid EVENT_WINDOW_BLOCKS".to_string()))?,
            confirmation_timeout_secs: env_var("CONFIRMATION_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid CONFIRMATION_TIMEOUT_SECS".to_string()))?,
            receipt_poll_interval_secs: env_var("RECEIPT_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .map_err(|_| GatewayError::Config("Invalid RECEIPT_POLL_INTERVAL_SECS".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| GatewayError::Config(format!("Missing env var: {key}")))
}
