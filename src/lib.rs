//! Solver library for a cross-chain deposit bridge
//!
//! A user deposits tokens on Chain A, this solver fulfills the deposit on
//! Chain B, proves the fulfillment back to Chain A through a storage-proof
//! attestation service, and claims reimbursement. Provides the chain
//! clients, the attestation client, the storage slot derivation the proofs
//! hinge on, and the run state machine that sequences them.

pub mod attestation;
pub mod chains;
pub mod config;
pub mod error;
pub mod service;
pub mod slots;

// Re-export public types for convenience
pub use attestation::{AttestationClient, QueryStatus, QueryStatusResponse};
pub use chains::{ChainReader, ChainWriter, Deposit};
pub use config::{AttestationConfig, ChainConfig, SolverConfig, SolverSigningConfig};
pub use error::SolverError;
pub use service::{Checkpoint, FulfillmentService, RunReport, RunState};
pub use slots::{derive_order_slots, field_slot, order_base_slot, OrderSlots};
