//! Ethereum JSON-RPC client for the Fuji C-Chain node.
//!
//! Transport and HTTP-level failures surface as
//! [`GatewayError::NodeUnavailable`] and are not retried here: the caller
//! decides its own backoff. JSON-RPC error objects whose message indicates
//! a revert map to [`GatewayError::ContractCallReverted`].

use async_trait::async_trait;
use primitive_types::{H160, H256};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::abi;
use crate::errors::{GatewayError, Result};

/// Block header fields the gateway cares about.
#[derive(Debug, Clone, Copy)]
pub struct BlockHeader {
    pub number: u64,
    /// Unix seconds at which the block closed.
    pub timestamp: u64,
}

/// A decoded `eth_getLogs` entry.
#[derive(Debug, Clone)]
pub struct RawLog {
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
    pub block_number: u64,
    pub transaction_hash: H256,
}

/// Filter for one bounded log scan. `to_block: None` means `latest`.
#[derive(Debug, Clone, Copy)]
pub struct LogFilter {
    pub address: H160,
    pub topic0: H256,
    pub from_block: u64,
    pub to_block: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TxReceipt {
    pub block_number: u64,
    /// Execution status from the receipt: `true` means included and
    /// successful, `false` means included but reverted.
    pub succeeded: bool,
}

/// The node RPC transport, the gateway's only external collaborator.
/// Everything above this trait runs against a test double.
#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;
    async fn block_number(&self) -> Result<u64>;
    async fn latest_block(&self) -> Result<BlockHeader>;
    async fn call(&self, to: H160, data: Vec<u8>) -> Result<Vec<u8>>;
    async fn logs(&self, filter: LogFilter) -> Result<Vec<RawLog>>;
    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TxReceipt>>;
    async fn accounts(&self) -> Result<Vec<H160>>;
    async fn send_transaction(&self, from: H160, to: H160, data: Vec<u8>) -> Result<H256>;
}

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BlockWire {
    number: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogWire {
    topics: Vec<String>,
    data: String,
    block_number: String,
    transaction_hash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptWire {
    status: String,
    block_number: String,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

pub struct EthRpcClient {
    client: Client,
    rpc_url: String,
}

impl EthRpcClient {
    pub fn new(client: Client, rpc_url: impl Into<String>) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::NodeUnavailable(format!(
                "HTTP {status} from node"
            )));
        }

        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            if err.message.to_ascii_lowercase().contains("revert") {
                return Err(GatewayError::ContractCallReverted(err.message));
            }
            return Err(GatewayError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        debug!(method, "rpc call ok");
        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl NodeClient for EthRpcClient {
    async fn chain_id(&self) -> Result<u64> {
        parse_quantity_value(&self.request("eth_chainId", json!([])).await?)
    }

    async fn block_number(&self) -> Result<u64> {
        parse_quantity_value(&self.request("eth_blockNumber", json!([])).await?)
    }

    async fn latest_block(&self) -> Result<BlockHeader> {
        let result = self
            .request("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let block: BlockWire = serde_json::from_value(result)
            .map_err(|e| GatewayError::Decode(format!("bad block payload: {e}")))?;
        Ok(BlockHeader {
            number: parse_quantity(&block.number)?,
            timestamp: parse_quantity(&block.timestamp)?,
        })
    }

    async fn call(&self, to: H160, data: Vec<u8>) -> Result<Vec<u8>> {
        let result = self
            .request(
                "eth_call",
                json!([{ "to": format_address(&to), "data": format_data(&data) }, "latest"]),
            )
            .await?;
        parse_data(result.as_str().ok_or_else(|| {
            GatewayError::Decode(format!("expected call return data, got {result}"))
        })?)
    }

    async fn logs(&self, filter: LogFilter) -> Result<Vec<RawLog>> {
        let to_block = filter
            .to_block
            .map(format_quantity)
            .unwrap_or_else(|| "latest".to_string());
        let result = self
            .request(
                "eth_getLogs",
                json!([{
                    "address": format_address(&filter.address),
                    "topics": [format!("{:#x}", filter.topic0)],
                    "fromBlock": format_quantity(filter.from_block),
                    "toBlock": to_block,
                }]),
            )
            .await?;
        let wires: Vec<LogWire> = serde_json::from_value(result)
            .map_err(|e| GatewayError::Decode(format!("bad log payload: {e}")))?;
        wires.into_iter().map(decode_log_wire).collect()
    }

    async fn transaction_receipt(&self, hash: H256) -> Result<Option<TxReceipt>> {
        let result = self
            .request("eth_getTransactionReceipt", json!([format!("{hash:#x}")]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let wire: ReceiptWire = serde_json::from_value(result)
            .map_err(|e| GatewayError::Decode(format!("bad receipt payload: {e}")))?;
        Ok(Some(TxReceipt {
            block_number: parse_quantity(&wire.block_number)?,
            succeeded: parse_quantity(&wire.status)? == 1,
        }))
    }

    async fn accounts(&self) -> Result<Vec<H160>> {
        let result = self.request("eth_accounts", json!([])).await?;
        let list: Vec<String> = serde_json::from_value(result)
            .map_err(|e| GatewayError::Decode(format!("bad accounts payload: {e}")))?;
        list.iter().map(|s| abi::parse_address(s)).collect()
    }

    async fn send_transaction(&self, from: H160, to: H160, data: Vec<u8>) -> Result<H256> {
        let result = self
            .request(
                "eth_sendTransaction",
                json!([{
                    "from": format_address(&from),
                    "to": format_address(&to),
                    "data": format_data(&data),
                }]),
            )
            .await?;
        abi::parse_hash(result.as_str().ok_or_else(|| {
            GatewayError::Decode(format!("expected transaction hash, got {result}"))
        })?)
    }
}

// ─────────────────────────────────────────────────────────
// Hex quantity and data helpers
// ─────────────────────────────────────────────────────────

fn format_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

fn format_address(address: &H160) -> String {
    format!("{address:#x}")
}

fn format_data(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

fn parse_quantity(s: &str) -> Result<u64> {
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| GatewayError::Decode(format!("bad hex quantity {s:?}: {e}")))
}

fn parse_quantity_value(value: &Value) -> Result<u64> {
    parse_quantity(value.as_str().ok_or_else(|| {
        GatewayError::Decode(format!("expected hex quantity, got {value}"))
    })?)
}

fn parse_data(s: &str) -> Result<Vec<u8>> {
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| GatewayError::Decode(format!("bad hex data {s:?}: {e}")))
}

fn decode_log_wire(wire: LogWire) -> Result<RawLog> {
    Ok(RawLog {
        topics: wire
            .topics
            .iter()
            .map(|t| abi::parse_hash(t))
            .collect::<Result<Vec<_>>>()?,
        data: parse_data(&wire.data)?,
        block_number: parse_quantity(&wire.block_number)?,
        transaction_hash: abi::parse_hash(&wire.transaction_hash)?,
    })
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
