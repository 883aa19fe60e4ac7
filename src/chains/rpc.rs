//! JSON-RPC Plumbing
//!
//! Shared reqwest-based JSON-RPC 2.0 client used by the chain reader and
//! writer. Transport failures, decode failures, and JSON-RPC error objects
//! all surface as [`SolverError::ChainRead`] tagged with the method name.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SolverError;

/// JSON-RPC request wrapper
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Minimal JSON-RPC client bound to one endpoint URL.
#[derive(Debug)]
pub struct RpcClient {
    /// HTTP client for JSON-RPC calls
    client: Client,
    /// Endpoint URL
    url: String,
}

impl RpcClient {
    /// Creates a client for the given endpoint.
    pub fn new(url: &str) -> Result<Self, SolverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy() // Avoid macOS system-configuration issues in tests
            .build()
            .map_err(|e| SolverError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    /// The endpoint this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one JSON-RPC request and returns the decoded `result`.
    ///
    /// A `null` result is an error here; use [`RpcClient::request_opt`] for
    /// methods like `eth_getTransactionReceipt` where `null` is meaningful.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, SolverError> {
        self.request_opt(method, params)
            .await?
            .ok_or_else(|| SolverError::chain_read(method, "missing result in response"))
    }

    /// Sends one JSON-RPC request, treating a `null` result as `None`.
    pub async fn request_opt<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<Option<T>, SolverError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SolverError::chain_read(method, format!("request failed: {e}")))?
            .json()
            .await
            .map_err(|e| SolverError::chain_read(method, format!("invalid response: {e}")))?;

        if let Some(error) = response.error {
            return Err(SolverError::chain_read(
                method,
                format!("{} ({})", error.message, error.code),
            ));
        }

        Ok(response.result)
    }
}

/// Parses a JSON-RPC quantity (`0x`-prefixed hex) into a u64.
pub fn parse_quantity(method: &str, value: &str) -> Result<u64, SolverError> {
    u64::from_str_radix(value.strip_prefix("0x").unwrap_or(value), 16)
        .map_err(|e| SolverError::chain_read(method, format!("invalid quantity '{value}': {e}")))
}

/// Parses a JSON-RPC quantity into a u128 (fee values can exceed u64).
pub fn parse_quantity_u128(method: &str, value: &str) -> Result<u128, SolverError> {
    u128::from_str_radix(value.strip_prefix("0x").unwrap_or(value), 16)
        .map_err(|e| SolverError::chain_read(method, format!("invalid quantity '{value}': {e}")))
}
