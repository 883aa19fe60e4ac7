//! Chain Reader
//!
//! Read-only client for a MultiTokenDeposit contract: fetches the most
//! recent deposit record and raw storage slots. RPC failures surface to
//! the caller untouched; nothing here retries.

use alloy_primitives::{Address, B256, U256};
use serde_json::json;
use tracing::debug;

use crate::chains::abi;
use crate::chains::rpc::RpcClient;
use crate::config::ChainConfig;
use crate::error::SolverError;

/// A deposit record as stored by the Chain A contract.
///
/// Immutable once read; `deposit_id` is the contract's deposit nonce minus
/// one at the time of the read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    /// Identifier of the deposit (monotonic)
    pub deposit_id: U256,
    /// Address that made the deposit
    pub user: Address,
    /// Token that was deposited
    pub token: Address,
    /// Token the user wants on the other chain
    pub token_wanted: Address,
    /// Deposited amount in base units
    pub amount: U256,
    /// Block timestamp of the deposit
    pub timestamp: U256,
}

/// Read-only client for one chain's deposit contract.
#[derive(Debug)]
pub struct ChainReader {
    /// JSON-RPC client
    rpc: RpcClient,
    /// Deposit contract address
    contract_addr: Address,
}

impl ChainReader {
    /// Creates a reader for the chain described by `config`.
    pub fn new(config: &ChainConfig) -> Result<Self, SolverError> {
        let contract_addr = parse_address(&config.name, &config.deposit_contract_addr)?;
        Ok(Self {
            rpc: RpcClient::new(&config.rpc_url)?,
            contract_addr,
        })
    }

    /// The deposit contract this reader is bound to.
    pub fn contract_addr(&self) -> Address {
        self.contract_addr
    }

    /// Reads the most recent deposit record.
    ///
    /// Reads the contract's monotonic `depositNonce`, then the record at
    /// `nonce - 1`. A zero nonce means no deposit has ever been made and
    /// fails with [`SolverError::NoDepositFound`] rather than underflowing.
    pub async fn get_last_deposit(&self) -> Result<Deposit, SolverError> {
        let nonce_data = self.eth_call(abi::encode_call("depositNonce()", &[])).await?;
        let nonce_words = abi::decode_words("eth_call(depositNonce)", &nonce_data)?;
        let nonce = nonce_words
            .first()
            .map(|w| abi::word_to_u256(*w))
            .ok_or_else(|| SolverError::chain_read("eth_call(depositNonce)", "empty return data"))?;

        if nonce.is_zero() {
            return Err(SolverError::NoDepositFound);
        }
        let last_id = nonce - U256::from(1);
        debug!("deposit nonce is {nonce}, reading deposit {last_id}");

        let deposit_data = self
            .eth_call(abi::encode_call(
                "deposits(uint256)",
                &[abi::u256_word(last_id)],
            ))
            .await?;
        let words = abi::decode_words("eth_call(deposits)", &deposit_data)?;
        if words.len() != 6 {
            return Err(SolverError::chain_read(
                "eth_call(deposits)",
                format!("expected 6 return words, got {}", words.len()),
            ));
        }

        Ok(Deposit {
            deposit_id: abi::word_to_u256(words[0]),
            user: abi::word_to_address(words[1]),
            token: abi::word_to_address(words[2]),
            token_wanted: abi::word_to_address(words[3]),
            amount: abi::word_to_u256(words[4]),
            timestamp: abi::word_to_u256(words[5]),
        })
    }

    /// Reads a raw 32-byte storage word at an explicit block number.
    ///
    /// Diagnostic path only: lets the run sanity-check slot contents
    /// before submitting them for attestation.
    pub async fn get_storage_value(
        &self,
        slot: B256,
        block_number: u64,
    ) -> Result<B256, SolverError> {
        let value: String = self
            .rpc
            .request(
                "eth_getStorageAt",
                vec![
                    json!(format!("0x{}", hex::encode(self.contract_addr))),
                    json!(format!("0x{}", hex::encode(slot))),
                    json!(format!("0x{block_number:x}")),
                ],
            )
            .await?;

        // Some nodes return unpadded words; go through U256 to normalize.
        let value = U256::from_str_radix(value.strip_prefix("0x").unwrap_or(&value), 16)
            .map_err(|e| {
                SolverError::chain_read("eth_getStorageAt", format!("invalid word '{value}': {e}"))
            })?;
        Ok(B256::from(value.to_be_bytes::<32>()))
    }

    /// Performs an `eth_call` against the deposit contract at the latest block.
    async fn eth_call(&self, calldata: Vec<u8>) -> Result<String, SolverError> {
        self.rpc
            .request(
                "eth_call",
                vec![
                    json!({
                        "to": format!("0x{}", hex::encode(self.contract_addr)),
                        "data": format!("0x{}", hex::encode(&calldata)),
                    }),
                    json!("latest"),
                ],
            )
            .await
    }
}

/// Parses a 0x-prefixed address from config.
pub(crate) fn parse_address(chain_name: &str, addr: &str) -> Result<Address, SolverError> {
    addr.parse::<Address>().map_err(|e| {
        SolverError::Configuration(format!(
            "invalid contract address '{addr}' for chain '{chain_name}': {e}"
        ))
    })
}
