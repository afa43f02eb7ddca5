//! # Hashing Utilities
//!
//! Keccak-256, the only hash function the settlement contract understands.
//!
//! The voucher hash is the one place where a single byte of difference
//! between signer and verifier silently breaks settlement, so its
//! construction is pinned down here and nowhere else:
//!
//! ```text
//! keccak256( channel_address (20 bytes) ‖ value (32 bytes, big-endian, left-padded) )
//! ```
//!
//! That is exactly `abi.encodePacked(address(this), value)` on the contract
//! side.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::config::{ADDRESS_LENGTH, HASH_OUTPUT_LENGTH};

/// Compute the keccak-256 digest of `data`.
pub fn keccak(data: &[u8]) -> B256 {
    keccak256(data)
}

/// The digest a payer signs to authorize `value` on `channel`.
///
/// # Example
///
/// ```
/// use alloy_primitives::{Address, U256};
/// use paychan_protocol::crypto::voucher_hash;
///
/// let a = voucher_hash(&Address::ZERO, &U256::from(1000u64));
/// let b = voucher_hash(&Address::ZERO, &U256::from(1001u64));
/// assert_ne!(a, b);
/// ```
pub fn voucher_hash(channel: &Address, value: &U256) -> B256 {
    let mut preimage = [0u8; ADDRESS_LENGTH + HASH_OUTPUT_LENGTH];
    preimage[..ADDRESS_LENGTH].copy_from_slice(channel.as_slice());
    preimage[ADDRESS_LENGTH..].copy_from_slice(&value.to_be_bytes::<HASH_OUTPUT_LENGTH>());
    keccak256(preimage)
}

/// First four bytes of the keccak-256 hash of a canonical Solidity function
/// signature, e.g. `"extend(uint256)"`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
