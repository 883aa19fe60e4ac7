//! Error Taxonomy
//!
//! Typed errors for every component of the solver. Each variant carries
//! enough context (step name, query id, upstream body) for the caller to
//! decide whether a failed run can be resumed manually.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the solver's components.
///
/// Every component operation returns `Result<_, SolverError>`; the
/// fulfillment run matches on the variant to drive its state machine.
/// No component retries on its own: resubmitting a fulfillment or claim
/// transaction could double-fulfill the deposit.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A required setting or secret is missing or malformed. Fatal, no run starts.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A chain RPC call failed or its response could not be decoded.
    #[error("chain read failed in {method}: {reason}")]
    ChainRead { method: String, reason: String },

    /// The deposit nonce on Chain A is zero, so there is no deposit to fulfill.
    #[error("no deposit found: deposit nonce is zero")]
    NoDepositFound,

    /// A state-changing transaction was rejected, ran out of gas, or reverted.
    #[error("transaction failed at {step}: {reason}")]
    Transaction { step: String, reason: String },

    /// The attestation service answered a submission with a non-success status.
    #[error("attestation submission rejected with HTTP {status}: {body}")]
    AttestationSubmission { status: u16, body: String },

    /// An attestation request could not be sent or its response parsed.
    #[error("attestation request to {endpoint} failed: {reason}")]
    AttestationTransport { endpoint: String, reason: String },

    /// The attestation service reported the query as FAILED.
    #[error("attestation query {query_id} reported FAILED")]
    AttestationQueryFailed { query_id: String },

    /// The poll loop exhausted its deadline while the query was still PENDING.
    /// Resumable: re-poll the same query id with a fresh deadline.
    #[error("attestation query {query_id} still pending after {waited:?}")]
    AttestationTimeout { query_id: String, waited: Duration },

    /// Reading or writing the run checkpoint file failed.
    #[error("checkpoint persistence failed: {0}")]
    Checkpoint(String),
}

impl SolverError {
    /// Shorthand for a chain read failure with method context.
    pub fn chain_read(method: &str, reason: impl ToString) -> Self {
        SolverError::ChainRead {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for a transaction failure with step context.
    pub fn transaction(step: &str, reason: impl ToString) -> Self {
        SolverError::Transaction {
            step: step.to_string(),
            reason: reason.to_string(),
        }
    }
}
