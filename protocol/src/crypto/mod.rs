//! # Cryptographic Primitives
//!
//! Everything the channel needs from cryptography, and nothing more:
//!
//! - **secp256k1 ECDSA** for voucher and transaction signatures, because
//!   that is what the EVM's `ecrecover` speaks.
//! - **Keccak-256** for the voucher hash and ABI selectors, for the same
//!   reason.
//!
//! Everything here is a thin, typed wrapper over `secp256k1` and
//! `alloy-primitives`. No home-grown curve arithmetic.

pub mod hash;
pub mod keys;

pub use hash::{function_selector, keccak, voucher_hash};
pub use keys::{address_from_public_key, recover_address, verify_hash, ChannelKeypair, KeyError};
