//! Shared test helpers for solver tests
//!
//! Constants, config builders, and JSON-RPC mock plumbing used across the
//! integration test files.

#![allow(dead_code)]

use deposit_solver::config::{AttestationConfig, ChainConfig, SolverSigningConfig};
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy user address (deposit recipient)
pub const DUMMY_USER_ADDR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// Dummy deposited token address
pub const DUMMY_TOKEN_ADDR: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Dummy wanted token address
pub const DUMMY_TOKEN_WANTED_ADDR: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

/// Dummy deposit contract address (used on both chains)
pub const DUMMY_CONTRACT_ADDR: &str = "0xdddddddddddddddddddddddddddddddddddddddd";

/// First Anvil/Hardhat devnet key, safe to embed in tests
pub const DUMMY_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Dummy attestation API key
pub const DUMMY_API_KEY: &str = "test-api-key";

/// Dummy query id issued by the attestation service
pub const DUMMY_QUERY_ID: &str = "query-12345";

// ============================================================================
// ABI WORDS
// ============================================================================

/// A 32-byte return word from a u64.
pub fn word(value: u64) -> String {
    format!("{value:064x}")
}

/// A 32-byte return word embedding an address.
pub fn addr_word(addr: &str) -> String {
    format!("{:0>64}", addr.trim_start_matches("0x"))
}

/// 0x-prefixed concatenation of return words.
pub fn return_data(words: &[String]) -> String {
    format!("0x{}", words.concat())
}

// ============================================================================
// CONFIG BUILDERS
// ============================================================================

/// Chain config pointing at a mock server.
pub fn chain_config(name: &str, chain_id: u64, rpc_url: &str) -> ChainConfig {
    ChainConfig {
        name: name.to_string(),
        rpc_url: rpc_url.to_string(),
        chain_id,
        deposit_contract_addr: DUMMY_CONTRACT_ADDR.to_string(),
    }
}

/// Attestation config with fast polling, pointing at a mock server.
pub fn attestation_config(api_url: &str, api_key_env: &str) -> AttestationConfig {
    AttestationConfig {
        api_url: api_url.to_string(),
        api_key_env: api_key_env.to_string(),
        poll_interval_ms: 10,
        max_wait_ms: 1000,
    }
}

/// Signing config with fast receipt polling.
pub fn signing_config(private_key_env: &str) -> SolverSigningConfig {
    SolverSigningConfig {
        private_key_env: private_key_env.to_string(),
        checkpoint_path: None,
        verify_slot_values: false,
        receipt_timeout_ms: 2000,
        receipt_poll_interval_ms: 10,
    }
}

// ============================================================================
// JSON-RPC MOCKS
// ============================================================================

/// Matches a JSON-RPC request by method name, optionally requiring a
/// substring somewhere in the serialized params (e.g. a selector or a
/// block number) to tell calls to the same method apart.
pub struct RpcMethod {
    rpc_method: &'static str,
    param_contains: Option<String>,
}

impl RpcMethod {
    pub fn named(rpc_method: &'static str) -> Self {
        Self {
            rpc_method,
            param_contains: None,
        }
    }

    pub fn with_param(rpc_method: &'static str, param_contains: &str) -> Self {
        Self {
            rpc_method,
            param_contains: Some(param_contains.to_string()),
        }
    }
}

impl Match for RpcMethod {
    fn matches(&self, request: &Request) -> bool {
        let body: Value = match serde_json::from_slice(&request.body) {
            Ok(v) => v,
            Err(_) => return false,
        };
        if body["method"] != self.rpc_method {
            return false;
        }
        match &self.param_contains {
            Some(fragment) => body["params"].to_string().contains(fragment.as_str()),
            None => true,
        }
    }
}

/// Mounts a JSON-RPC mock answering `matcher` with `result`.
pub async fn mount_rpc(server: &MockServer, matcher: RpcMethod, result: Value) {
    Mock::given(method("POST"))
        .and(matcher)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        })))
        .mount(server)
        .await;
}

/// Mounts everything a `ChainWriter` submission needs, confirming the
/// transaction at `block_number`.
pub async fn mount_writer_mocks(server: &MockServer, block_number: u64) {
    mount_rpc(server, RpcMethod::named("eth_chainId"), json!("0x7a69")).await;
    mount_rpc(server, RpcMethod::named("eth_getTransactionCount"), json!("0x0")).await;
    mount_rpc(server, RpcMethod::named("eth_gasPrice"), json!("0x3b9aca00")).await;
    mount_rpc(server, RpcMethod::named("eth_estimateGas"), json!("0x186a0")).await;
    mount_rpc(
        server,
        RpcMethod::named("eth_sendRawTransaction"),
        json!("0x1111111111111111111111111111111111111111111111111111111111111111"),
    )
    .await;
    mount_rpc(
        server,
        RpcMethod::named("eth_getTransactionReceipt"),
        json!({ "status": "0x1", "blockNumber": format!("0x{block_number:x}") }),
    )
    .await;
}

/// Mounts the two reads `get_last_deposit` performs: a deposit nonce of
/// `deposit_id + 1` and the deposit record itself.
pub async fn mount_deposit_mocks(server: &MockServer, deposit_id: u64, amount: u64) {
    // depositNonce() selector
    mount_rpc(
        server,
        RpcMethod::with_param("eth_call", "0xde35f5cb"),
        json!(return_data(&[word(deposit_id + 1)])),
    )
    .await;
    // deposits(uint256) selector
    mount_rpc(
        server,
        RpcMethod::with_param("eth_call", "0xb02c43d0"),
        json!(return_data(&[
            word(deposit_id),
            addr_word(DUMMY_USER_ADDR),
            addr_word(DUMMY_TOKEN_ADDR),
            addr_word(DUMMY_TOKEN_WANTED_ADDR),
            word(amount),
            word(1_700_000_000),
        ])),
    )
    .await;
}

/// Methods of the JSON-RPC requests a mock server received, in order.
pub async fn received_rpc_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            serde_json::from_slice::<Value>(&r.body)
                .ok()
                .and_then(|b| b["method"].as_str().map(str::to_string))
        })
        .collect()
}
