//! Solver service modules
//!
//! The fulfillment run state machine and the checkpoint store that makes
//! interrupted runs resumable.

pub mod checkpoint;
pub mod fulfillment;

// Re-export for convenience
pub use checkpoint::Checkpoint;
pub use fulfillment::{FulfillmentService, RunReport, RunState};
