//! Contract event kinds, domain records, and the bounded log fetcher.

use std::sync::Arc;

use primitive_types::{H160, H256, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::abi;
use crate::errors::Result;
use crate::rpc::{LogFilter, NodeClient, RawLog};

/// The two event types the SimpleStorage contract emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ValueUpdated,
    OwnerSet,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValueUpdated => "value_updated",
            Self::OwnerSet => "owner_set",
        }
    }

    /// topic0 the node indexes this event under.
    pub fn topic(&self) -> H256 {
        match self {
            Self::ValueUpdated => abi::event_topic(abi::VALUE_UPDATED),
            Self::OwnerSet => abi::event_topic(abi::OWNER_SET),
        }
    }
}

/// `ValueUpdated(uint256 newValue)` — an append-only historical fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueUpdatedEvent {
    pub block_number: u64,
    pub new_value: U256,
    pub tx_hash: H256,
}

/// `OwnerSet(address indexed oldOwner, address indexed newOwner)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerSetEvent {
    pub block_number: u64,
    pub old_owner: H160,
    pub new_owner: H160,
    pub tx_hash: H256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractEvent {
    ValueUpdated(ValueUpdatedEvent),
    OwnerSet(OwnerSetEvent),
}

impl ContractEvent {
    pub fn block_number(&self) -> u64 {
        match self {
            Self::ValueUpdated(ev) => ev.block_number,
            Self::OwnerSet(ev) => ev.block_number,
        }
    }
}

/// Scans a fixed trailing window of blocks for contract events. Each call
/// is a fresh bounded scan, not a subscription; callers wanting continuous
/// updates re-invoke on their own schedule.
pub struct EventFetcher {
    node: Arc<dyn NodeClient>,
    contract: H160,
    window_blocks: u64,
}

impl EventFetcher {
    pub fn new(node: Arc<dyn NodeClient>, contract: H160, window_blocks: u64) -> Self {
        Self {
            node,
            contract,
            window_blocks,
        }
    }

    /// Fetch events of one kind from `max(0, latest − window)` through
    /// `latest`, inclusive. An empty window yields an empty sequence,
    /// never an error.
    pub async fn fetch(&self, kind: EventKind) -> Result<Vec<ContractEvent>> {
        let current = self.node.block_number().await?;
        let from_block = current.saturating_sub(self.window_blocks);
        let logs = self
            .node
            .logs(LogFilter {
                address: self.contract,
                topic0: kind.topic(),
                from_block,
                to_block: None,
            })
            .await?;
        let events: Vec<ContractEvent> =
            logs.iter().filter_map(|log| decode_log(kind, log)).collect();
        debug!(kind = kind.as_str(), from_block, count = events.len(), "fetched events");
        Ok(events)
    }
}

/// Decode one raw log into a domain record. A log without the expected
/// topic/data shape is skipped with a warning rather than failing the
/// whole scan.
fn decode_log(kind: EventKind, log: &RawLog) -> Option<ContractEvent> {
    match kind {
        EventKind::ValueUpdated => {
            let new_value = match abi::decode_uint256(&log.data) {
                Ok(value) => value,
                Err(e) => {
                    warn!("skipping malformed ValueUpdated log: {e}");
                    return None;
                }
            };
            Some(ContractEvent::ValueUpdated(ValueUpdatedEvent {
                block_number: log.block_number,
                new_value,
                tx_hash: log.transaction_hash,
            }))
        }
        EventKind::OwnerSet => {
            if log.topics.len() != 3 {
                warn!("skipping malformed OwnerSet log: {} topics", log.topics.len());
                return None;
            }
            Some(ContractEvent::OwnerSet(OwnerSetEvent {
                block_number: log.block_number,
                old_owner: abi::topic_address(&log.topics[1]),
                new_owner: abi::topic_address(&log.topics[2]),
                tx_hash: log.transaction_hash,
            }))
        }
    }
}
