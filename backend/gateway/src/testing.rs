//! In-crate test doubles for the node and wallet boundaries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use primitive_types::{H160, H256, U256};

use crate::abi;
use crate::errors::{GatewayError, Result};
use crate::rpc::{BlockHeader, LogFilter, NodeClient, RawLog, TxReceipt};
use crate::wallet::{TxRequest, WalletTransport};

/// Programmable stand-in for the JSON-RPC node. Every trait method counts
/// as one transport call, so tests can assert that a path never touched
/// the network.
pub struct MockNode {
    pub owner: H160,
    value: Mutex<U256>,
    block: AtomicU64,
    timestamp: AtomicU64,
    log_entries: Mutex<Vec<RawLog>>,
    receipts: Mutex<HashMap<H256, TxReceipt>>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
    chain_id: u64,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            owner: H160::repeat_byte(0x0f),
            value: Mutex::new(U256::zero()),
            block: AtomicU64::new(100),
            timestamp: AtomicU64::new(1_700_000_000),
            log_entries: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
            chain_id: 43113,
        }
    }

    pub fn transport_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_value(&self, value: U256) {
        *self.value.lock().unwrap() = value;
    }

    pub fn set_block(&self, number: u64) {
        self.block.store(number, Ordering::SeqCst);
    }

    pub fn set_unavailable(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn managed_account(&self) -> H160 {
        H160::repeat_byte(0xa0)
    }

    pub fn broadcast_hash(&self) -> H256 {
        H256::repeat_byte(0xcd)
    }

    /// Record a successful `setValue` transaction: receipt, state change,
    /// new block, and the matching `ValueUpdated` log.
    pub fn confirm_set_value(&self, hash: H256, value: U256) {
        let block = self.block.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_value(value);
        self.receipts.lock().unwrap().insert(
            hash,
            TxReceipt {
                block_number: block,
                succeeded: true,
            },
        );
        self.push_value_updated(block, value, hash);
    }

    /// Record a transaction included with failure status.
    pub fn revert(&self, hash: H256) {
        let block = self.block.fetch_add(1, Ordering::SeqCst) + 1;
        self.receipts.lock().unwrap().insert(
            hash,
            TxReceipt {
                block_number: block,
                succeeded: false,
            },
        );
    }

    pub fn push_value_updated(&self, block_number: u64, value: U256, hash: H256) {
        self.log_entries.lock().unwrap().push(RawLog {
            topics: vec![abi::event_topic(abi::VALUE_UPDATED)],
            data: value.to_big_endian().to_vec(),
            block_number,
            transaction_hash: hash,
        });
    }

    pub fn push_owner_set(&self, block_number: u64, old: H160, new: H160, hash: H256) {
        self.log_entries.lock().unwrap().push(RawLog {
            topics: vec![
                abi::event_topic(abi::OWNER_SET),
                address_topic(old),
                address_topic(new),
            ],
            data: Vec::new(),
            block_number,
            transaction_hash: hash,
        });
    }

    fn transport(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::NodeUnavailable("mock transport down".to_string()));
        }
        Ok(())
    }
}

fn address_topic(address: H160) -> H256 {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    H256::from_slice(&word)
}

#[async_trait]
impl NodeClient for MockNode {
    async fn chain_id(&self) -> Result<u64> {
        self.transport()?;
        Ok(self.chain_id)
    }

    async fn block_number(&self) -> Result<u64> {
        self.transport()?;
        Ok(self.block.load(Ordering::SeqCst))
    }

    async fn latest_block(&self) -> Result<BlockHeader> {
        self.transport()?;
        Ok(BlockHeader {
            number: self.block.load(Ordering::SeqCst),
            timestamp: self.timestamp.load(Ordering::SeqCst),
        })
    }

    async fn call(&self, _to: H160, data: Vec<u8>) -> Result<Vec<u8>> {
        self.transport()?;
        if data == abi::encode_get_value() {
            Ok(self.value.lock().unwrap().to_big_endian().to_vec())
        } else if data == abi::encode_owner() {
            Ok(address_topic(self.owner).as_bytes().to_vec())
        } else {
            Err(GatewayError::ContractCallReverted(
                "unknown selector".to_string(),
            ))
        }
    }

    async fn logs(&self, filter: LogFilter) -> Result<Vec<RawLog>> {
        self.transport()?;
        Ok(self
            .log_entries
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.topics.first() == Some(&filter.topic0))
            .filter(|log| {
                log.block_number >= filter.from_block
                    && filter.to_block.map_or(true, |to| log.block_number <= to)
            })
            .cloned()
            .collect())
    }

    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TxReceipt>> {
        self.transport()?;
        Ok(self.receipts.lock().unwrap().get(&hash).copied())
    }

    async fn accounts(&self) -> Result<Vec<H160>> {
        self.transport()?;
        Ok(vec![self.managed_account()])
    }

    async fn send_transaction(&self, _from: H160, _to: H160, _data: Vec<u8>) -> Result<H256> {
        self.transport()?;
        Ok(self.broadcast_hash())
    }
}

enum WalletMode {
    Resolve,
    Stall,
    Reject,
}

/// Scripted wallet: resolves with a scripted hash, stalls forever, or
/// rejects like a user dismissing the signing prompt.
pub struct MockWallet {
    account: H160,
    hash: Mutex<H256>,
    mode: WalletMode,
    sends: AtomicUsize,
}

impl MockWallet {
    pub fn ok() -> Self {
        Self::ok_with_hash(H256::repeat_byte(0xaa))
    }

    pub fn ok_with_hash(hash: H256) -> Self {
        Self::with_mode(hash, WalletMode::Resolve)
    }

    pub fn stalled() -> Self {
        Self::with_mode(H256::zero(), WalletMode::Stall)
    }

    pub fn rejecting() -> Self {
        Self::with_mode(H256::zero(), WalletMode::Reject)
    }

    fn with_mode(hash: H256, mode: WalletMode) -> Self {
        Self {
            account: H160::repeat_byte(0xa0),
            hash: Mutex::new(hash),
            mode,
            sends: AtomicUsize::new(0),
        }
    }

    /// Hash the next `sign_and_send` resolves with.
    pub fn set_next_hash(&self, hash: H256) {
        *self.hash.lock().unwrap() = hash;
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletTransport for MockWallet {
    async fn request_account(&self) -> Result<H160> {
        Ok(self.account)
    }

    async fn sign_and_send(&self, _tx: TxRequest) -> Result<H256> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            WalletMode::Resolve => Ok(*self.hash.lock().unwrap()),
            WalletMode::Stall => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            WalletMode::Reject => Err(GatewayError::Rpc {
                code: 4001,
                message: "user rejected the request".to_string(),
            }),
        }
    }
}
