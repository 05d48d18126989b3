//! The fixed SimpleStorage contract interface.
//!
//! `getValue() -> uint256`, `owner() -> address`, `setValue(uint256)`,
//! events `ValueUpdated(uint256 newValue)` and
//! `OwnerSet(address indexed oldOwner, address indexed newOwner)`.
//! Selectors and topics are derived from these signatures; nothing here is
//! configurable.

use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

use crate::errors::{GatewayError, Result};

pub const GET_VALUE: &str = "getValue()";
pub const OWNER: &str = "owner()";
pub const SET_VALUE: &str = "setValue(uint256)";
pub const VALUE_UPDATED: &str = "ValueUpdated(uint256)";
pub const OWNER_SET: &str = "OwnerSet(address,address)";

/// First four bytes of the Keccak-256 of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Keccak-256 of an event signature; the log's topic0.
pub fn event_topic(signature: &str) -> H256 {
    H256::from_slice(&Keccak256::digest(signature.as_bytes()))
}

pub fn encode_get_value() -> Vec<u8> {
    selector(GET_VALUE).to_vec()
}

pub fn encode_owner() -> Vec<u8> {
    selector(OWNER).to_vec()
}

/// `setValue(uint256)` calldata: selector followed by one 32-byte word.
pub fn encode_set_value(value: U256) -> Vec<u8> {
    let mut data = selector(SET_VALUE).to_vec();
    data.extend_from_slice(&value.to_big_endian());
    data
}

/// Decode a single uint256 return word.
pub fn decode_uint256(data: &[u8]) -> Result<U256> {
    if data.len() != 32 {
        return Err(GatewayError::Decode(format!(
            "expected a 32-byte word, got {} bytes",
            data.len()
        )));
    }
    Ok(U256::from_big_endian(data))
}

/// Decode an address return word (left-padded to 32 bytes).
pub fn decode_address(data: &[u8]) -> Result<H160> {
    if data.len() != 32 {
        return Err(GatewayError::Decode(format!(
            "expected a 32-byte word, got {} bytes",
            data.len()
        )));
    }
    Ok(H160::from_slice(&data[12..]))
}

/// An indexed address packed into an event topic.
pub fn topic_address(topic: &H256) -> H160 {
    H160::from_slice(&topic.as_bytes()[12..])
}

/// Parse a 0x-prefixed 20-byte hex address.
pub fn parse_address(s: &str) -> Result<H160> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| GatewayError::Decode(format!("bad address {s:?}: {e}")))?;
    if bytes.len() != 20 {
        return Err(GatewayError::Decode(format!(
            "bad address length: {} bytes",
            bytes.len()
        )));
    }
    Ok(H160::from_slice(&bytes))
}

/// Parse a 0x-prefixed 32-byte hex hash.
pub fn parse_hash(s: &str) -> Result<H256> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| GatewayError::Decode(format!("bad hash {s:?}: {e}")))?;
    if bytes.len() != 32 {
        return Err(GatewayError::Decode(format!(
            "bad hash length: {} bytes",
            bytes.len()
        )));
    }
    Ok(H256::from_slice(&bytes))
}
