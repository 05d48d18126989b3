//! The wallet boundary: whatever can sign and broadcast a transaction.

use std::sync::Arc;

use async_trait::async_trait;
use primitive_types::{H160, H256};

use crate::errors::{GatewayError, Result};
use crate::rpc::NodeClient;

/// An unsigned `setValue` call, ready for a wallet to sign and broadcast.
#[derive(Debug, Clone)]
pub struct TxRequest {
    pub to: H160,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// Opaque signing capability supplied by the environment. The lifecycle
/// controller never assumes a concrete implementation.
#[async_trait]
pub trait WalletTransport: Send + Sync {
    async fn request_account(&self) -> Result<H160>;
    async fn sign_and_send(&self, tx: TxRequest) -> Result<H256>;
}

/// Wallet backed by a node-managed (unlocked) account, the usual setup
/// against a local dev node. Signing happens node-side through
/// `eth_sendTransaction`.
pub struct NodeWallet {
    node: Arc<dyn NodeClient>,
}

impl NodeWallet {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl WalletTransport for NodeWallet {
    async fn request_account(&self) -> Result<H160> {
        self.node
            .accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Config("node manages no accounts".to_string()))
    }

    async fn sign_and_send(&self, tx: TxRequest) -> Result<H256> {
        let from = self.request_account().await?;
        self.node.send_transaction(from, tx.to, tx.data).await
    }
}
