//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the solver.
//! Configuration includes the two chain endpoints, the attestation service
//! connection, and signing settings. Secrets (API key, private key) are
//! never stored in the file; the file names the environment variables that
//! hold them.

use serde::{Deserialize, Serialize};

use crate::error::SolverError;

/// Main configuration structure containing all solver settings.
///
/// Chain A is where the user deposited and where the claim lands;
/// Chain B is where the solver creates the fulfillment order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Deposit chain configuration (deposits are read and claims submitted here)
    pub chain_a: ChainConfig,
    /// Fulfillment chain configuration (orders are created and proven here)
    pub chain_b: ChainConfig,
    /// Attestation service configuration
    pub attestation: AttestationConfig,
    /// Solver signing and run settings
    pub solver: SolverSigningConfig,
}

/// Configuration for a blockchain connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Human-readable name for the chain
    pub name: String,
    /// RPC endpoint URL for blockchain communication
    pub rpc_url: String,
    /// Unique chain identifier
    pub chain_id: u64,
    /// Address of the MultiTokenDeposit contract on this chain
    pub deposit_contract_addr: String,
}

/// Configuration for the storage-proof attestation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// Attestation API base URL (e.g., "https://api.herodotus.cloud")
    pub api_url: String,
    /// Environment variable name containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Interval between query status polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on the whole poll loop in milliseconds
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

/// Solver signing and per-run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverSigningConfig {
    /// Environment variable name containing the signing private key (hex)
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
    /// Path where run checkpoints are persisted (checkpointing is skipped if unset)
    #[serde(default)]
    pub checkpoint_path: Option<String>,
    /// Read back the derived slots on Chain B before submitting the
    /// attestation query and log their values (diagnostic only)
    #[serde(default)]
    pub verify_slot_values: bool,
    /// Upper bound on waiting for a transaction receipt in milliseconds
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    /// Interval between receipt polls in milliseconds
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
}

fn default_api_key_env() -> String {
    "HERODOTUS_API_KEY".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5000
}

fn default_max_wait_ms() -> u64 {
    600_000
}

fn default_private_key_env() -> String {
    "SOLVER_PRIVATE_KEY".to_string()
}

fn default_receipt_timeout_ms() -> u64 {
    120_000
}

fn default_receipt_poll_interval_ms() -> u64 {
    1000
}

impl SolverConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file. If None, uses SOLVER_CONFIG_PATH env var or default.
    ///
    /// # Returns
    ///
    /// * `Ok(SolverConfig)` - Successfully loaded and validated configuration
    /// * `Err(SolverError)` - File missing, unparsable, or invalid
    pub fn load_from_path(path: Option<&str>) -> Result<Self, SolverError> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("SOLVER_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/solver.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| SolverError::Configuration(format!("failed to read '{config_path}': {e}")))?;
            let config: SolverConfig = toml::from_str(&content)
                .map_err(|e| SolverError::Configuration(format!("failed to parse '{config_path}': {e}")))?;
            config.validate()?;
            Ok(config)
        } else {
            Err(SolverError::Configuration(format!(
                "Configuration file '{config_path}' not found. Please copy the template:\n\
                cp config/solver.template.toml config/solver.toml\n\
                Then edit config/solver.toml with your actual values.",
            )))
        }
    }

    /// Loads configuration from the default path (see [`SolverConfig::load_from_path`]).
    pub fn load() -> Result<Self, SolverError> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// Checks:
    /// - Chain A and Chain B have distinct chain IDs
    /// - Contract addresses are 0x-prefixed 20-byte hex strings
    /// - Polling intervals are nonzero and the deadline covers at least one poll
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.chain_a.chain_id == self.chain_b.chain_id {
            return Err(SolverError::Configuration(format!(
                "chain_a and chain_b must have distinct chain IDs (both are {})",
                self.chain_a.chain_id
            )));
        }

        for chain in [&self.chain_a, &self.chain_b] {
            validate_address(&chain.name, &chain.deposit_contract_addr)?;
            if chain.rpc_url.is_empty() {
                return Err(SolverError::Configuration(format!(
                    "chain '{}' has an empty rpc_url",
                    chain.name
                )));
            }
        }

        if self.attestation.poll_interval_ms == 0 {
            return Err(SolverError::Configuration(
                "attestation.poll_interval_ms must be nonzero".to_string(),
            ));
        }
        if self.attestation.max_wait_ms < self.attestation.poll_interval_ms {
            return Err(SolverError::Configuration(format!(
                "attestation.max_wait_ms ({}) is shorter than poll_interval_ms ({})",
                self.attestation.max_wait_ms, self.attestation.poll_interval_ms
            )));
        }
        if self.solver.receipt_poll_interval_ms == 0 {
            return Err(SolverError::Configuration(
                "solver.receipt_poll_interval_ms must be nonzero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checks that an address is a 0x-prefixed 20-byte hex string.
fn validate_address(chain_name: &str, addr: &str) -> Result<(), SolverError> {
    let hex_part = addr.strip_prefix("0x").ok_or_else(|| {
        SolverError::Configuration(format!(
            "contract address '{addr}' on chain '{chain_name}' must start with 0x"
        ))
    })?;
    if hex_part.len() != 40 || hex::decode(hex_part).is_err() {
        return Err(SolverError::Configuration(format!(
            "contract address '{addr}' on chain '{chain_name}' is not a 20-byte hex string"
        )));
    }
    Ok(())
}

/// Reads a secret from the environment variable named in config.
pub fn read_env_secret(purpose: &str, var_name: &str) -> Result<String, SolverError> {
    std::env::var(var_name).map_err(|_| {
        SolverError::Configuration(format!(
            "environment variable '{var_name}' ({purpose}) is not set"
        ))
    })
}
