//! Point-in-time reads of the contract's on-chain state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use primitive_types::{H160, U256};
use tracing::debug;

use crate::abi;
use crate::errors::{GatewayError, Result};
use crate::rpc::NodeClient;

/// An immutable point-in-time read. Freshness is defined by
/// `block_number`, not wall-clock time: re-reads may observe the same
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSnapshot {
    pub value: U256,
    pub block_number: u64,
    /// Close time of the observed block.
    pub observed_at: DateTime<Utc>,
}

/// Pure query layer over the node: no locking, no caching. A snapshot
/// taken concurrently with an in-flight write may be stale; that is
/// surfaced through `block_number`, never hidden.
#[derive(Clone)]
pub struct ChainReader {
    node: Arc<dyn NodeClient>,
    contract: H160,
}

impl ChainReader {
    pub fn new(node: Arc<dyn NodeClient>, contract: H160) -> Self {
        Self { node, contract }
    }

    pub fn node(&self) -> Arc<dyn NodeClient> {
        self.node.clone()
    }

    pub fn contract(&self) -> H160 {
        self.contract
    }

    /// Read the stored value in the context of the latest block.
    pub async fn snapshot(&self) -> Result<ChainSnapshot> {
        let block = self.node.latest_block().await?;
        let data = self.node.call(self.contract, abi::encode_get_value()).await?;
        let value = abi::decode_uint256(&data)?;
        let observed_at = i64::try_from(block.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| {
                GatewayError::Decode(format!("block timestamp out of range: {}", block.timestamp))
            })?;
        debug!(block = block.number, %value, "snapshot");
        Ok(ChainSnapshot {
            value,
            block_number: block.number,
            observed_at,
        })
    }

    /// Read the contract owner.
    pub async fn owner(&self) -> Result<H160> {
        let data = self.node.call(self.contract, abi::encode_owner()).await?;
        abi::decode_address(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockNode;

    #[tokio::test]
    async fn snapshot_reads_value_and_block_context() {
        let node = Arc::new(MockNode::new());
        node.set_value(U256::from(99u64));
        node.set_block(1234);

        let reader = ChainReader::new(node.clone(), H160::repeat_byte(0x11));
        let snapshot = reader.snapshot().await.unwrap();

        assert_eq!(snapshot.value, U256::from(99u64));
        assert_eq!(snapshot.block_number, 1234);
        assert!(snapshot.observed_at.timestamp() > 0);
    }

    #[tokio::test]
    async fn owner_is_decoded_from_the_padded_word() {
        let node = Arc::new(MockNode::new());
        let reader = ChainReader::new(node.clone(), H160::repeat_byte(0x11));
        assert_eq!(reader.owner().await.unwrap(), node.owner);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_as_node_unavailable() {
        let node = Arc::new(MockNode::new());
        node.set_unavailable();
        let reader = ChainReader::new(node, H160::repeat_byte(0x11));
        assert!(matches!(
            reader.snapshot().await,
            Err(GatewayError::NodeUnavailable(_))
        ));
    }
}
