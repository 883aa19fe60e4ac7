//! Storage Slot Derivation
//!
//! Pure computation of the Chain B storage slots that hold a fulfillment
//! order's fields. The contract keeps orders in
//! `mapping(uint256 => FulfillmentOrder)` at slot index 1, so Solidity's
//! layout rule applies:
//!
//! - base slot of `orders[orderId]` = `keccak256(orderId ++ 1)`
//! - slot of field at offset `k`   = `keccak256(k ++ baseSlot)`
//!
//! with every operand encoded as a 32-byte big-endian word. The derived
//! slots feed directly into the attestation query; a single-bit mismatch
//! with the deployed layout makes the proof attest the wrong data, so
//! this module is covered by literal reference vectors in the tests.

use alloy_primitives::{B256, U256};
use sha3::{Digest, Keccak256};

/// Storage slot index of the fulfillment-order mapping in the Chain B contract.
pub const FULFILLMENT_ORDER_MAPPING_SLOT: u64 = 1;

/// Field offsets inside the `FulfillmentOrder` struct, in declaration order.
pub const DEPOSIT_ID_OFFSET: u64 = 0;
/// See [`DEPOSIT_ID_OFFSET`].
pub const USER_OFFSET: u64 = 1;
/// See [`DEPOSIT_ID_OFFSET`].
pub const TOKEN_OFFSET: u64 = 2;
/// See [`DEPOSIT_ID_OFFSET`].
pub const AMOUNT_OFFSET: u64 = 3;

/// The four derived field slots of one fulfillment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSlots {
    /// Slot holding the order's `depositId` field
    pub deposit_id: B256,
    /// Slot holding the order's `user` field
    pub user: B256,
    /// Slot holding the order's `token` field
    pub token: B256,
    /// Slot holding the order's `amount` field
    pub amount: B256,
}

impl OrderSlots {
    /// The slots in struct declaration order, as submitted to the attestation service.
    pub fn as_array(&self) -> [B256; 4] {
        [self.deposit_id, self.user, self.token, self.amount]
    }
}

/// Keccak256 of two concatenated 32-byte words.
fn hash_words(first: [u8; 32], second: [u8; 32]) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(first);
    hasher.update(second);
    B256::from_slice(&hasher.finalize())
}

/// Computes the base slot of `orders[order_id]`.
pub fn order_base_slot(order_id: U256) -> B256 {
    hash_words(
        order_id.to_be_bytes::<32>(),
        U256::from(FULFILLMENT_ORDER_MAPPING_SLOT).to_be_bytes::<32>(),
    )
}

/// Computes the slot of the field at `offset` within the order rooted at `base`.
pub fn field_slot(offset: u64, base: B256) -> B256 {
    hash_words(U256::from(offset).to_be_bytes::<32>(), base.0)
}

/// Derives all four field slots for the order identified by `order_id`.
pub fn derive_order_slots(order_id: U256) -> OrderSlots {
    let base = order_base_slot(order_id);
    OrderSlots {
        deposit_id: field_slot(DEPOSIT_ID_OFFSET, base),
        user: field_slot(USER_OFFSET, base),
        token: field_slot(TOKEN_OFFSET, base),
        amount: field_slot(AMOUNT_OFFSET, base),
    }
}
