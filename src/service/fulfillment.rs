//! Fulfillment Run
//!
//! Sequences one deposit through the end-to-end flow:
//!
//! 1. Read the last deposit from Chain A.
//! 2. Create the matching fulfillment order on Chain B; capture the
//!    confirming block number.
//! 3. Derive the order's four storage slots and submit them for
//!    attestation, scoped to that block.
//! 4. Await attestation completion (bounded poll loop).
//! 5. Claim reimbursement on Chain A.
//!
//! Each run is strictly sequential and owns exactly one deposit. Any
//! failure is terminal for the run; the typed error carries the step
//! context, and the checkpoint written before each irreversible action
//! lets a later invocation resume at step 3 instead of re-reading a
//! deposit pointer that may have advanced.

use alloy_primitives::U256;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::attestation::AttestationClient;
use crate::chains::{abi, ChainReader, ChainWriter};
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::service::checkpoint::Checkpoint;
use crate::slots::{derive_order_slots, OrderSlots};

/// States of one fulfillment run, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing read yet
    Start,
    /// Last deposit read from Chain A
    DepositRead,
    /// Fulfillment order confirmed on Chain B
    OrderCreated,
    /// Attestation query submitted
    QuerySubmitted,
    /// Attestation reported DONE
    ProofReady,
    /// Claim confirmed on Chain A (terminal success)
    Claimed,
}

impl RunState {
    /// Uppercase name used in transition logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Start => "START",
            RunState::DepositRead => "DEPOSIT_READ",
            RunState::OrderCreated => "ORDER_CREATED",
            RunState::QuerySubmitted => "QUERY_SUBMITTED",
            RunState::ProofReady => "PROOF_READY",
            RunState::Claimed => "CLAIMED",
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Deposit that was fulfilled
    pub deposit_id: U256,
    /// Order id used on Chain B
    pub order_id: U256,
    /// Block that confirmed the fulfillment order
    pub fulfillment_block: u64,
    /// Attestation query that proved it
    pub query_id: String,
}

/// Orchestrates fulfillment runs from an explicit configuration.
///
/// Instances are independent; N deposits can be processed concurrently as
/// N services (or N runs sharing writers behind `Arc` so submissions
/// against the same signing key serialize).
pub struct FulfillmentService {
    /// Reader for Chain A (deposits)
    reader_a: ChainReader,
    /// Reader for Chain B (diagnostic slot reads)
    reader_b: ChainReader,
    /// Writer for Chain A (claims)
    writer_a: ChainWriter,
    /// Writer for Chain B (fulfillment orders)
    writer_b: ChainWriter,
    /// Attestation service client
    attestation: AttestationClient,
    /// Interval between attestation status polls
    poll_interval: Duration,
    /// Upper bound on the attestation poll loop
    max_wait: Duration,
    /// Where to persist run checkpoints (skipped if unset)
    checkpoint_path: Option<PathBuf>,
    /// Read the derived slots back before submitting the query
    verify_slot_values: bool,
}

impl FulfillmentService {
    /// Builds the service and all its clients from configuration.
    ///
    /// Fails with [`SolverError::Configuration`] if any referenced
    /// environment secret is missing; no run starts in that case.
    pub fn from_config(config: &SolverConfig) -> Result<Self, SolverError> {
        Ok(Self {
            reader_a: ChainReader::new(&config.chain_a)?,
            reader_b: ChainReader::new(&config.chain_b)?,
            writer_a: ChainWriter::from_config(&config.chain_a, &config.solver)?,
            writer_b: ChainWriter::from_config(&config.chain_b, &config.solver)?,
            attestation: AttestationClient::from_config(&config.attestation)?,
            poll_interval: Duration::from_millis(config.attestation.poll_interval_ms),
            max_wait: Duration::from_millis(config.attestation.max_wait_ms),
            checkpoint_path: config.solver.checkpoint_path.clone().map(PathBuf::from),
            verify_slot_values: config.solver.verify_slot_values,
        })
    }

    /// Builds the service from already-constructed parts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader_a: ChainReader,
        reader_b: ChainReader,
        writer_a: ChainWriter,
        writer_b: ChainWriter,
        attestation: AttestationClient,
        poll_interval: Duration,
        max_wait: Duration,
        checkpoint_path: Option<PathBuf>,
        verify_slot_values: bool,
    ) -> Self {
        Self {
            reader_a,
            reader_b,
            writer_a,
            writer_b,
            attestation,
            poll_interval,
            max_wait,
            checkpoint_path,
            verify_slot_values,
        }
    }

    /// Runs the full flow for the latest deposit on Chain A.
    pub async fn run(&self) -> Result<RunReport, SolverError> {
        let deposit = self.reader_a.get_last_deposit().await?;
        self.log_transition(RunState::DepositRead);
        info!(
            "Last deposit: id={}, user={}, amount={}, token_wanted={}",
            deposit.deposit_id, deposit.user, deposit.amount, deposit.token_wanted
        );

        // Order ids on Chain B are assigned as deposit id + 1. This is a
        // policy of this solver, not something the chain exposes: if the
        // contract's assignment ever diverges, the derived slots silently
        // target the wrong order. Recorded on the checkpoint so a resumed
        // run reuses the value instead of recomputing it.
        let order_id = deposit.deposit_id + U256::from(1);
        let mut checkpoint = Checkpoint::for_deposit(&deposit, order_id);
        self.persist(&checkpoint)?;

        let fulfillment_block = self
            .writer_b
            .create_fulfillment_order(
                deposit.deposit_id,
                deposit.amount,
                deposit.token_wanted,
                deposit.user,
            )
            .await?;
        self.log_transition(RunState::OrderCreated);
        checkpoint.fulfillment_block = Some(fulfillment_block);
        self.persist(&checkpoint)?;

        self.prove_and_claim(checkpoint, fulfillment_block).await
    }

    /// Resumes a run whose fulfillment order is already confirmed.
    ///
    /// Never re-reads the latest deposit and never re-submits the order
    /// transaction; slots are re-derived from the checkpointed
    /// `(deposit_id, fulfillment_block)` pair. If the checkpoint already
    /// carries a query id, submission is skipped too and the loop
    /// re-polls that query.
    pub async fn resume(&self, checkpoint: Checkpoint) -> Result<RunReport, SolverError> {
        let fulfillment_block = checkpoint.fulfillment_block.ok_or_else(|| {
            SolverError::Checkpoint(
                "checkpoint has no fulfillment block; the order was never confirmed, start a fresh run"
                    .to_string(),
            )
        })?;
        info!(
            "Resuming run for deposit {} from confirmed order at block {fulfillment_block}",
            checkpoint.deposit_id
        );
        self.prove_and_claim(checkpoint, fulfillment_block).await
    }

    /// Steps 3-5: derive slots, attest, claim.
    async fn prove_and_claim(
        &self,
        mut checkpoint: Checkpoint,
        fulfillment_block: u64,
    ) -> Result<RunReport, SolverError> {
        let slots = derive_order_slots(checkpoint.order_id);

        if self.verify_slot_values {
            self.log_slot_values(&slots, fulfillment_block).await?;
        }

        let query_id = match checkpoint.query_id.clone() {
            Some(id) => {
                debug!("Reusing attestation query {id} from checkpoint");
                id
            }
            None => {
                let id = self
                    .attestation
                    .submit_batch_query(
                        fulfillment_block,
                        self.reader_b.contract_addr(),
                        &slots.as_array(),
                    )
                    .await?;
                checkpoint.query_id = Some(id.clone());
                self.persist(&checkpoint)?;
                id
            }
        };
        self.log_transition(RunState::QuerySubmitted);

        let proof = self
            .attestation
            .await_completion(&query_id, self.poll_interval, self.max_wait)
            .await?;
        self.log_transition(RunState::ProofReady);
        debug!("Attestation result: {proof}");

        self.writer_a
            .claim_with_proof(
                checkpoint.deposit_id,
                checkpoint.amount,
                fulfillment_block,
                checkpoint.order_id,
            )
            .await?;
        self.log_transition(RunState::Claimed);

        Ok(RunReport {
            deposit_id: checkpoint.deposit_id,
            order_id: checkpoint.order_id,
            fulfillment_block,
            query_id,
        })
    }

    /// Reads the derived slots back from Chain B and logs their values.
    ///
    /// Diagnostic only, but a failed read still aborts: a run that cannot
    /// see the storage it is about to attest should not submit the query.
    async fn log_slot_values(
        &self,
        slots: &OrderSlots,
        block_number: u64,
    ) -> Result<(), SolverError> {
        let deposit_id = self
            .reader_b
            .get_storage_value(slots.deposit_id, block_number)
            .await?;
        let user = self.reader_b.get_storage_value(slots.user, block_number).await?;
        let token = self.reader_b.get_storage_value(slots.token, block_number).await?;
        let amount = self.reader_b.get_storage_value(slots.amount, block_number).await?;

        info!(
            "Slot values at block {block_number}: depositId={}, user={}, token={}, amount={}",
            abi::word_to_u256(deposit_id),
            abi::word_to_address(user),
            abi::word_to_address(token),
            abi::word_to_u256(amount)
        );
        Ok(())
    }

    /// Persists the checkpoint if a path is configured.
    fn persist(&self, checkpoint: &Checkpoint) -> Result<(), SolverError> {
        match &self.checkpoint_path {
            Some(path) => checkpoint.save(path),
            None => {
                debug!("No checkpoint path configured, skipping checkpoint");
                Ok(())
            }
        }
    }

    fn log_transition(&self, state: RunState) {
        info!("Run state: {}", state.as_str());
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
