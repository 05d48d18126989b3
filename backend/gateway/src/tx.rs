//! Transaction lifecycle: submit a `setValue` write through the wallet and
//! track it from Submitted through Pending to Confirmed or Failed.
//!
//! One controller instance is one logical user session. It tracks at most
//! one non-terminal transaction at a time and rejects overlapping submits;
//! the guard is a single check-and-set on the active-record slot, never a
//! broader lock.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use primitive_types::{H256, U256};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::abi;
use crate::chain::{ChainReader, ChainSnapshot};
use crate::errors::{GatewayError, Result};
use crate::wallet::{TxRequest, WalletTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Submitted,
    Pending,
    Confirmed,
    Failed,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

/// The single in-flight transaction tracked per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionRecord {
    /// `None` only while Submitted; the hash is the record's identity
    /// from Pending onward.
    pub hash: Option<H256>,
    pub status: TxStatus,
    pub requested_value: U256,
}

/// How a tracked submission ended locally.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The node confirmed the transaction. `snapshot` is the
    /// reconciliation read taken right after confirmation.
    Confirmed { hash: H256, snapshot: ChainSnapshot },
    /// Local tracking was stopped. The on-chain outcome resolves
    /// asynchronously and shows up on a later read.
    Detached { hash: H256 },
}

pub struct TxLifecycle {
    reader: ChainReader,
    wallet: Arc<dyn WalletTransport>,
    expected_chain_id: u64,
    confirmation_timeout: Duration,
    receipt_poll_interval: Duration,
    active: Mutex<Option<TransactionRecord>>,
    transitions: watch::Sender<Option<TransactionRecord>>,
}

impl TxLifecycle {
    pub fn new(
        reader: ChainReader,
        wallet: Arc<dyn WalletTransport>,
        expected_chain_id: u64,
        confirmation_timeout: Duration,
        receipt_poll_interval: Duration,
    ) -> Self {
        let (transitions, _) = watch::channel(None);
        Self {
            reader,
            wallet,
            expected_chain_id,
            confirmation_timeout,
            receipt_poll_interval,
            active: Mutex::new(None),
            transitions,
        }
    }

    /// Observe Submitted/Pending/Confirmed/Failed transitions. `None`
    /// means Idle.
    pub fn subscribe(&self) -> watch::Receiver<Option<TransactionRecord>> {
        self.transitions.subscribe()
    }

    /// The currently tracked record, if any.
    pub fn active(&self) -> Option<TransactionRecord> {
        *self.slot()
    }

    /// Stop tracking the in-flight transaction. This cannot revoke it
    /// on-chain; the outcome is reconciled on a later read.
    pub fn stop_tracking(&self) {
        let mut slot = self.slot();
        if slot.take().is_some() {
            let _ = self.transitions.send(None);
            info!("stopped tracking the active transaction");
        }
    }

    /// Submit `setValue(requested_value)` through the wallet and drive the
    /// record to a terminal state.
    ///
    /// `wallet_chain_id` is the network the caller's wallet reports; a
    /// mismatch fails before anything is sent anywhere. A non-terminal
    /// active record rejects the submit. Every terminal failure restores
    /// Idle, so a retry is always possible.
    pub async fn submit(
        &self,
        requested_value: U256,
        wallet_chain_id: u64,
    ) -> Result<SubmitOutcome> {
        if wallet_chain_id != self.expected_chain_id {
            return Err(GatewayError::WrongNetwork {
                expected: self.expected_chain_id,
                actual: wallet_chain_id,
            });
        }
        self.claim(requested_value)?;

        match self.drive(requested_value).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    // Check-and-set on the single active-record slot.
    fn claim(&self, requested_value: U256) -> Result<()> {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|r| !r.status.is_terminal()) {
            return Err(GatewayError::TransactionAlreadyPending);
        }
        let record = TransactionRecord {
            hash: None,
            status: TxStatus::Submitted,
            requested_value,
        };
        *slot = Some(record);
        let _ = self.transitions.send(Some(record));
        Ok(())
    }

    async fn drive(&self, requested_value: U256) -> Result<SubmitOutcome> {
        let request = TxRequest {
            to: self.reader.contract(),
            data: abi::encode_set_value(requested_value),
            chain_id: self.expected_chain_id,
        };
        let hash = self.wallet.sign_and_send(request).await?;
        self.transition(hash, TxStatus::Pending);
        info!(hash = ?hash, "transaction pending");

        let node = self.reader.node();
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            if !self.is_tracking(hash) {
                return Ok(SubmitOutcome::Detached { hash });
            }
            if let Some(receipt) = node.transaction_receipt(hash).await? {
                if receipt.succeeded {
                    self.transition(hash, TxStatus::Confirmed);
                    // Reconciliation read happens before the slot clears.
                    let snapshot = self.reader.snapshot().await?;
                    self.clear();
                    info!(block = receipt.block_number, "transaction confirmed");
                    return Ok(SubmitOutcome::Confirmed { hash, snapshot });
                }
                return Err(GatewayError::TransactionReverted(format!(
                    "included in block {} with failure status",
                    receipt.block_number
                )));
            }
            if Instant::now() >= deadline {
                return Err(GatewayError::ConfirmationTimeout);
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<TransactionRecord>> {
        self.active.lock().expect("active-record lock poisoned")
    }

    fn is_tracking(&self, hash: H256) -> bool {
        self.slot().as_ref().is_some_and(|r| r.hash == Some(hash))
    }

    fn transition(&self, hash: H256, status: TxStatus) {
        let mut slot = self.slot();
        if let Some(record) = slot.as_mut() {
            record.hash = Some(hash);
            record.status = status;
            let _ = self.transitions.send(Some(*record));
        }
    }

    // Terminal failure: surface Failed, then restore Idle.
    fn fail(&self, err: &GatewayError) {
        let mut slot = self.slot();
        if let Some(mut record) = slot.take() {
            if record.status != TxStatus::Confirmed {
                record.status = TxStatus::Failed;
                let _ = self.transitions.send(Some(record));
            }
            let _ = self.transitions.send(None);
            warn!("transaction failed: {err}");
        }
    }

    fn clear(&self) {
        *self.slot() = None;
        let _ = self.transitions.send(None);
    }
}
