//! SimpleStorage chain gateway.
//!
//! Reads and writes a single on-chain integer storage slot on the
//! Avalanche Fuji testnet: a pull-based [`chain::ChainReader`] for
//! snapshots, an [`events::EventFetcher`] for bounded historical log
//! scans, and a [`tx::TxLifecycle`] controller that tracks a
//! client-signed `setValue` write from submission to confirmation.
//! The node transport and the signing wallet are trait seams
//! ([`rpc::NodeClient`], [`wallet::WalletTransport`]); everything above
//! them runs unchanged against test doubles.

pub mod abi;
pub mod api;
pub mod chain;
pub mod config;
pub mod errors;
pub mod events;
pub mod rpc;
pub mod tx;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
