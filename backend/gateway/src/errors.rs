//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The RPC transport could not be reached or answered with a
    /// non-success HTTP status. Retryable by the caller after backoff;
    /// never retried internally.
    #[error("node unavailable: {0}")]
    NodeUnavailable(String),

    /// A read call was rejected by the contract.
    #[error("contract call reverted: {0}")]
    ContractCallReverted(String),

    #[error("wrong network: expected chain id {expected}, got {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("a transaction is already pending for this session")]
    TransactionAlreadyPending,

    /// No receipt arrived within the configured bound. The on-chain
    /// outcome is unknown, not failed; reconcile with a later snapshot.
    #[error("transaction confirmation timed out")]
    ConfirmationTimeout,

    /// The node confirmed the transaction was included but reverted.
    #[error("transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::NodeUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
