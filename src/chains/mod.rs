//! Chain Clients Module
//!
//! JSON-RPC clients for the two deposit contracts: a read-only reader
//! (deposit records, raw storage) and a signing writer (fulfillment order
//! creation, claims), plus the shared RPC and ABI plumbing.

pub mod abi;
pub mod reader;
pub mod rpc;
pub mod writer;

// Re-export for convenience
pub use reader::{ChainReader, Deposit};
pub use rpc::RpcClient;
pub use writer::ChainWriter;
