//! Minimal ABI Encoding
//!
//! The deposit contracts expose only fixed-arity functions over `uint256`
//! and `address`, so calldata is a 4-byte selector followed by 32-byte
//! words. Selectors are computed at runtime as the leading bytes of the
//! Keccak256 of the canonical signature.

use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

use crate::error::SolverError;

/// First four bytes of the Keccak256 of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let mut hasher = Keccak256::new();
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Encodes a call as selector plus 32-byte argument words.
pub fn encode_call(signature: &str, args: &[B256]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg.as_slice());
    }
    data
}

/// A `uint256` argument as a 32-byte word.
pub fn u256_word(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// An `address` argument left-padded to a 32-byte word.
pub fn address_word(addr: Address) -> B256 {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr.as_slice());
    B256::from(word)
}

/// Splits `0x`-prefixed return data into 32-byte words.
pub fn decode_words(method: &str, data: &str) -> Result<Vec<B256>, SolverError> {
    let raw = hex::decode(data.strip_prefix("0x").unwrap_or(data))
        .map_err(|e| SolverError::chain_read(method, format!("invalid return data: {e}")))?;
    if raw.len() % 32 != 0 {
        return Err(SolverError::chain_read(
            method,
            format!("return data length {} is not word-aligned", raw.len()),
        ));
    }
    Ok(raw.chunks_exact(32).map(B256::from_slice).collect())
}

/// The address held in the low 20 bytes of a storage/return word.
pub fn word_to_address(word: B256) -> Address {
    Address::from_slice(&word.as_slice()[12..])
}

/// The full 32-byte word as a `uint256`.
pub fn word_to_u256(word: B256) -> U256 {
    U256::from_be_bytes(word.0)
}
