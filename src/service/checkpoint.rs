//! Run Checkpoint Persistence
//!
//! A run performs irreversible on-chain actions, and the "last deposit"
//! on Chain A may advance while a run is in flight, so a crashed run must
//! never be restarted from the top. The checkpoint persists everything
//! needed to resume after a confirmed fulfillment order: the deposit
//! fields, the asserted order id, the confirming block number, and the
//! attestation query id once one exists.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chains::Deposit;
use crate::error::SolverError;

/// Persistent state of one fulfillment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Deposit being fulfilled
    pub deposit_id: U256,
    /// Amount owed to the user
    pub amount: U256,
    /// Recipient of the fulfillment
    pub user: Address,
    /// Token the user wants on Chain B
    pub token_wanted: Address,
    /// Order id on Chain B (deposit_id + 1 by policy, recorded so resume
    /// never recomputes it from a deposit pointer that may have moved)
    pub order_id: U256,
    /// Block that confirmed the fulfillment order, once known
    pub fulfillment_block: Option<u64>,
    /// Attestation query id, once submitted
    pub query_id: Option<String>,
}

impl Checkpoint {
    /// Starts a checkpoint for a deposit about to be fulfilled.
    pub fn for_deposit(deposit: &Deposit, order_id: U256) -> Self {
        Self {
            deposit_id: deposit.deposit_id,
            amount: deposit.amount,
            user: deposit.user,
            token_wanted: deposit.token_wanted,
            order_id,
            fulfillment_block: None,
            query_id: None,
        }
    }

    /// Writes the checkpoint as JSON, replacing any previous one.
    pub fn save(&self, path: &Path) -> Result<(), SolverError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SolverError::Checkpoint(format!("serialize: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| SolverError::Checkpoint(format!("write '{}': {e}", path.display())))
    }

    /// Loads a previously saved checkpoint.
    pub fn load(path: &Path) -> Result<Self, SolverError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SolverError::Checkpoint(format!("read '{}': {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| SolverError::Checkpoint(format!("parse '{}': {e}", path.display())))
    }
}
