//! Attestation API Client
//!
//! HTTP client for the storage-proof attestation service. The service is
//! the system of record for proof generation: the solver submits a batch
//! query naming the block and the storage slots to attest, then polls the
//! query status until the service reports DONE.
//!
//! The service gives no completion-time guarantee, so the poll loop
//! enforces a local deadline. Hitting it is resumable: the query id stays
//! valid and can be re-polled with a fresh deadline.

use alloy_primitives::{Address, B256};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::{read_env_secret, AttestationConfig};
use crate::error::SolverError;

// ============================================================================
// WIRE STRUCTURES
// ============================================================================

/// Request body for POST /submit-batch-query.
#[derive(Debug, Serialize)]
struct BatchQueryRequest {
    query: Vec<QueryBlock>,
}

/// One block-scoped query within a batch.
#[derive(Debug, Serialize)]
struct QueryBlock {
    block_id: BlockId,
    accounts: Vec<AccountSlots>,
}

/// Block reference for a query.
#[derive(Debug, Serialize)]
struct BlockId {
    number: u64,
}

/// Slots to attest for one account.
#[derive(Debug, Serialize)]
struct AccountSlots {
    address: String,
    slots: Vec<String>,
}

/// Response body of POST /submit-batch-query.
#[derive(Debug, Deserialize)]
struct SubmitQueryResponse {
    query_id: String,
}

/// Lifecycle states of an attestation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum QueryStatus {
    /// Proof generation is still running
    #[serde(rename = "PENDING")]
    Pending,
    /// Proof is ready; the result payload accompanies this status
    #[serde(rename = "DONE")]
    Done,
    /// The service could not generate the proof
    #[serde(rename = "FAILED")]
    Failed,
}

/// Response body of GET /get-query-status/{id}.
#[derive(Debug, Deserialize)]
pub struct QueryStatusResponse {
    /// Current lifecycle state
    pub status: QueryStatus,
    /// Proof payload, present once status is DONE
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

// ============================================================================
// CLIENT
// ============================================================================

/// Client for the attestation service's batch-query API.
pub struct AttestationClient {
    /// HTTP client
    client: Client,
    /// API base URL (no trailing slash)
    base_url: String,
    /// Value of the X-API-KEY header
    api_key: String,
}

impl AttestationClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SolverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .no_proxy() // Avoid macOS system-configuration issues in tests
            .build()
            .map_err(|e| SolverError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Creates a client with the API key read from the environment
    /// variable named in config.
    pub fn from_config(config: &AttestationConfig) -> Result<Self, SolverError> {
        let api_key = read_env_secret("attestation API key", &config.api_key_env)?;
        Self::new(&config.api_url, &api_key)
    }

    /// Submits one block-scoped batch query for the given account slots.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Query id issued by the service
    /// * `Err(SolverError)` - Non-success response (with the upstream body
    ///   attached) or transport failure
    pub async fn submit_batch_query(
        &self,
        block_number: u64,
        address: Address,
        slots: &[B256],
    ) -> Result<String, SolverError> {
        let url = format!("{}/submit-batch-query", self.base_url);
        let body = BatchQueryRequest {
            query: vec![QueryBlock {
                block_id: BlockId {
                    number: block_number,
                },
                accounts: vec![AccountSlots {
                    address: format!("0x{}", hex::encode(address)),
                    slots: slots
                        .iter()
                        .map(|s| format!("0x{}", hex::encode(s)))
                        .collect(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SolverError::AttestationTransport {
                endpoint: "submit-batch-query".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SolverError::AttestationSubmission {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SubmitQueryResponse =
            response
                .json()
                .await
                .map_err(|e| SolverError::AttestationTransport {
                    endpoint: "submit-batch-query".to_string(),
                    reason: format!("invalid response: {e}"),
                })?;

        info!(
            "Attestation query submitted for block {block_number}: query_id={}",
            parsed.query_id
        );
        Ok(parsed.query_id)
    }

    /// Fetches the current status of a query.
    pub async fn get_query_status(
        &self,
        query_id: &str,
    ) -> Result<QueryStatusResponse, SolverError> {
        let url = format!("{}/get-query-status/{query_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| SolverError::AttestationTransport {
                endpoint: "get-query-status".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SolverError::AttestationTransport {
                endpoint: "get-query-status".to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        response
            .json()
            .await
            .map_err(|e| SolverError::AttestationTransport {
                endpoint: "get-query-status".to_string(),
                reason: format!("invalid response: {e}"),
            })
    }

    /// Polls a query until it completes, fails, or the deadline lapses.
    ///
    /// Polls immediately, then sleeps `poll_interval` between attempts.
    /// The wall-clock spent never exceeds `max_wait`: if the next poll
    /// would land past the deadline the loop stops with
    /// [`SolverError::AttestationTimeout`], which is resumable by
    /// re-polling the same query id.
    pub async fn await_completion(
        &self,
        query_id: &str,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<serde_json::Value, SolverError> {
        let started = Instant::now();
        loop {
            let response = self.get_query_status(query_id).await?;
            match response.status {
                QueryStatus::Done => {
                    info!("Attestation query {query_id} is DONE");
                    return Ok(response.result.unwrap_or(serde_json::Value::Null));
                }
                QueryStatus::Failed => {
                    return Err(SolverError::AttestationQueryFailed {
                        query_id: query_id.to_string(),
                    });
                }
                QueryStatus::Pending => {
                    debug!("Attestation query {query_id} still pending");
                }
            }

            if started.elapsed() + poll_interval > max_wait {
                return Err(SolverError::AttestationTimeout {
                    query_id: query_id.to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(poll_interval).await;
        }
    }
}
