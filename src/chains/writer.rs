//! Chain Writer
//!
//! Signs and submits the two state-changing transactions of a run:
//! `createFulfillmentOrder` on Chain B and `claimWithProof` on Chain A.
//! Transactions are signed locally (legacy format, EIP-155) and pushed via
//! `eth_sendRawTransaction`; the writer then polls for the receipt and
//! returns the confirming block number.
//!
//! Failed submissions are terminal for the run, never retried: the chain
//! does not guarantee idempotence and a resubmitted fulfillment could
//! double-fulfill the deposit.

use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, TxKind, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::chains::abi;
use crate::chains::reader::parse_address;
use crate::chains::rpc::{parse_quantity, parse_quantity_u128, RpcClient};
use crate::config::{read_env_secret, ChainConfig, SolverSigningConfig};
use crate::error::SolverError;

/// Transaction receipt fields the writer cares about.
#[derive(Debug, Deserialize)]
struct TxReceipt {
    /// Execution status ("0x1" success, "0x0" reverted)
    status: String,
    /// Block number the transaction was included in
    #[serde(rename = "blockNumber")]
    block_number: String,
}

/// Signing client for one chain's deposit contract.
///
/// Concurrent runs may share a writer behind an `Arc`: the internal lock
/// serializes the nonce-fetch-to-submission window per signing key, so
/// parallel submissions cannot collide on nonces.
pub struct ChainWriter {
    /// JSON-RPC client
    rpc: RpcClient,
    /// Local signing key
    signer: PrivateKeySigner,
    /// Deposit contract address
    contract_addr: Address,
    /// Chain id fetched from the node on first use
    chain_id: OnceCell<u64>,
    /// Serializes nonce fetch and raw submission per signer
    submit_lock: Mutex<()>,
    /// Interval between receipt polls
    receipt_poll_interval: Duration,
    /// Upper bound on waiting for a receipt
    receipt_timeout: Duration,
}

impl ChainWriter {
    /// Creates a writer for the chain described by `config`.
    pub fn new(
        config: &ChainConfig,
        private_key: &str,
        receipt_poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> Result<Self, SolverError> {
        let signer = private_key
            .parse::<PrivateKeySigner>()
            .map_err(|_| SolverError::Configuration("invalid signing private key".to_string()))?;
        let contract_addr = parse_address(&config.name, &config.deposit_contract_addr)?;

        Ok(Self {
            rpc: RpcClient::new(&config.rpc_url)?,
            signer,
            contract_addr,
            chain_id: OnceCell::new(),
            submit_lock: Mutex::new(()),
            receipt_poll_interval,
            receipt_timeout,
        })
    }

    /// Creates a writer with the private key read from the environment
    /// variable named in the signing config.
    pub fn from_config(
        config: &ChainConfig,
        signing: &SolverSigningConfig,
    ) -> Result<Self, SolverError> {
        let private_key = read_env_secret("signing private key", &signing.private_key_env)?;
        Self::new(
            config,
            &private_key,
            Duration::from_millis(signing.receipt_poll_interval_ms),
            Duration::from_millis(signing.receipt_timeout_ms),
        )
    }

    /// The address derived from the signing key.
    pub fn signer_addr(&self) -> Address {
        self.signer.address()
    }

    /// The deposit contract this writer targets.
    pub fn contract_addr(&self) -> Address {
        self.contract_addr
    }

    /// Creates a fulfillment order on this chain.
    ///
    /// # Arguments
    ///
    /// * `deposit_id` - Deposit being fulfilled (from Chain A)
    /// * `amount` - Amount owed to the user
    /// * `token` - Token the user wants (the deposit's `tokenWanted`)
    /// * `user` - Recipient of the fulfillment
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Block number of the confirming block. This is the
    ///   anchor of the later proof: the attestation is scoped to the exact
    ///   block at which the order's storage was written.
    /// * `Err(SolverError)` - Submission rejected, reverted, or timed out
    pub async fn create_fulfillment_order(
        &self,
        deposit_id: U256,
        amount: U256,
        token: Address,
        user: Address,
    ) -> Result<u64, SolverError> {
        let calldata = abi::encode_call(
            "createFulfillmentOrder(uint256,uint256,address,address)",
            &[
                abi::u256_word(deposit_id),
                abi::u256_word(amount),
                abi::address_word(token),
                abi::address_word(user),
            ],
        );
        let block_number = self.submit_and_confirm("createFulfillmentOrder", calldata).await?;
        info!("Fulfillment order for deposit {deposit_id} confirmed at block {block_number}");
        Ok(block_number)
    }

    /// Claims reimbursement on this chain once the proof is available.
    pub async fn claim_with_proof(
        &self,
        deposit_id: U256,
        amount: U256,
        block_number: u64,
        order_id: U256,
    ) -> Result<(), SolverError> {
        let calldata = abi::encode_call(
            "claimWithProof(uint256,uint256,uint256,uint256)",
            &[
                abi::u256_word(deposit_id),
                abi::u256_word(amount),
                abi::u256_word(U256::from(block_number)),
                abi::u256_word(order_id),
            ],
        );
        let confirmed_at = self.submit_and_confirm("claimWithProof", calldata).await?;
        info!("Claim for deposit {deposit_id} confirmed at block {confirmed_at}");
        Ok(())
    }

    /// Signs a contract call, submits it, and waits for its receipt.
    ///
    /// Nonce fetch through raw submission happens under the signer lock;
    /// the receipt wait does not hold the lock since the transaction is in
    /// the pool by then and later nonce reads (`pending`) account for it.
    async fn submit_and_confirm(&self, step: &str, calldata: Vec<u8>) -> Result<u64, SolverError> {
        let chain_id = self.fetch_chain_id().await?;
        let from = format!("0x{}", hex::encode(self.signer.address()));
        let to = format!("0x{}", hex::encode(self.contract_addr));
        let data = format!("0x{}", hex::encode(&calldata));

        let tx_hash = {
            let _guard = self.submit_lock.lock().await;

            let nonce_hex: String = self
                .rpc
                .request(
                    "eth_getTransactionCount",
                    vec![json!(from), json!("pending")],
                )
                .await?;
            let nonce = parse_quantity("eth_getTransactionCount", &nonce_hex)?;

            let gas_price_hex: String = self.rpc.request("eth_gasPrice", vec![]).await?;
            let gas_price = parse_quantity_u128("eth_gasPrice", &gas_price_hex)?;

            let estimate_hex: String = self
                .rpc
                .request(
                    "eth_estimateGas",
                    vec![json!({ "from": from, "to": to, "data": data })],
                )
                .await?;
            let estimate = parse_quantity("eth_estimateGas", &estimate_hex)?;
            // 20% headroom over the node estimate
            let gas_limit = estimate + estimate / 5;

            let tx = TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price,
                gas_limit,
                to: TxKind::Call(self.contract_addr),
                value: U256::ZERO,
                input: calldata.into(),
            };
            let signature = self
                .signer
                .sign_hash_sync(&tx.signature_hash())
                .map_err(|e| SolverError::transaction(step, format!("signing failed: {e}")))?;
            let raw = tx.into_signed(signature).encoded_2718();

            debug!("submitting {step}: nonce={nonce}, gas_limit={gas_limit}");
            let tx_hash: String = self
                .rpc
                .request(
                    "eth_sendRawTransaction",
                    vec![json!(format!("0x{}", hex::encode(&raw)))],
                )
                .await
                .map_err(|e| SolverError::transaction(step, e))?;
            info!("{step} submitted. Transaction hash: {tx_hash}");
            tx_hash
        };

        self.wait_for_receipt(step, &tx_hash).await
    }

    /// Polls for the receipt of `tx_hash` until inclusion or the local deadline.
    async fn wait_for_receipt(&self, step: &str, tx_hash: &str) -> Result<u64, SolverError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<TxReceipt> = self
                .rpc
                .request_opt("eth_getTransactionReceipt", vec![json!(tx_hash)])
                .await
                .map_err(|e| SolverError::transaction(step, e))?;

            if let Some(receipt) = receipt {
                if receipt.status != "0x1" {
                    return Err(SolverError::transaction(
                        step,
                        format!("transaction {tx_hash} reverted (status {})", receipt.status),
                    ));
                }
                return parse_quantity("eth_getTransactionReceipt", &receipt.block_number);
            }

            if Instant::now() + self.receipt_poll_interval > deadline {
                return Err(SolverError::transaction(
                    step,
                    format!(
                        "no receipt for {tx_hash} within {:?}",
                        self.receipt_timeout
                    ),
                ));
            }
            sleep(self.receipt_poll_interval).await;
        }
    }

    /// Chain id as reported by the node, fetched once.
    async fn fetch_chain_id(&self) -> Result<u64, SolverError> {
        self.chain_id
            .get_or_try_init(|| async {
                let hex_id: String = self.rpc.request("eth_chainId", vec![]).await?;
                parse_quantity("eth_chainId", &hex_id)
            })
            .await
            .copied()
    }
}
