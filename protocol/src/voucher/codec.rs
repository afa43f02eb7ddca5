//! Voucher wire format.
//!
//! A voucher travels from payer to payee as a small bincode blob:
//!
//! | Field        | Type     | Contents                                     |
//! |--------------|----------|----------------------------------------------|
//! | `sig`        | bytes    | 65-byte recoverable signature `r ‖ s ‖ v`    |
//! | `pub_key`    | bytes    | 33-byte compressed secp256k1 public key      |
//! | `value`      | bytes    | cumulative value, minimal big-endian         |
//! | `channel_id` | string   | channel identifier                           |
//!
//! Encoding uses fixed-width integers and rejects trailing bytes, so a
//! decoded voucher re-encodes to exactly the bytes it came from. Values with
//! leading zero bytes are refused for the same reason.

use alloy_primitives::U256;
use bincode::Options;
use serde::{Deserialize, Serialize};

use super::error::VoucherError;
use crate::config::HASH_OUTPUT_LENGTH;

/// Upper bound on an encoded voucher. Real vouchers are ~150 bytes; the
/// limit stops a hostile length prefix from allocating gigabytes.
pub const MAX_VOUCHER_BYTES: u64 = 4 * 1024;

/// A signed claim that `value` (cumulative) is owed on `channel_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentVoucher {
    /// Recoverable signature over the voucher hash.
    pub signature: Vec<u8>,
    /// Compressed public key of the signer.
    pub public_key: Vec<u8>,
    /// Cumulative value authorized so far.
    pub value: U256,
    /// Identifier of the channel the value is owed on.
    pub channel_id: String,
}

#[derive(Serialize, Deserialize)]
struct VoucherWire {
    sig: Vec<u8>,
    pub_key: Vec<u8>,
    value: Vec<u8>,
    channel_id: String,
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_VOUCHER_BYTES)
}

impl PaymentVoucher {
    /// Serialize into the wire format.
    pub fn encode(&self) -> Result<Vec<u8>, VoucherError> {
        let wire = VoucherWire {
            sig: self.signature.clone(),
            pub_key: self.public_key.clone(),
            value: self.value.to_be_bytes_trimmed_vec(),
            channel_id: self.channel_id.clone(),
        };
        wire_options()
            .serialize(&wire)
            .map_err(|e| VoucherError::Codec(e.to_string()))
    }

    /// Parse wire bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, VoucherError> {
        let wire: VoucherWire = wire_options()
            .deserialize(bytes)
            .map_err(|e| VoucherError::Codec(e.to_string()))?;

        if wire.value.len() > HASH_OUTPUT_LENGTH {
            return Err(VoucherError::ValueTooLarge(wire.value.len()));
        }
        if wire.value.first() == Some(&0) {
            return Err(VoucherError::Codec(
                "value has leading zero bytes".to_string(),
            ));
        }
        let value = U256::try_from_be_slice(&wire.value)
            .ok_or(VoucherError::ValueTooLarge(wire.value.len()))?;

        Ok(Self {
            signature: wire.sig,
            public_key: wire.pub_key,
            value,
            channel_id: wire.channel_id,
        })
    }

    /// Hex form of the wire bytes, for copy/paste transports.
    pub fn to_hex(&self) -> Result<String, VoucherError> {
        self.encode().map(hex::encode)
    }

    /// Parse the hex form produced by [`to_hex`](Self::to_hex).
    pub fn from_hex(s: &str) -> Result<Self, VoucherError> {
        let trimmed = s.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped).map_err(|e| VoucherError::Codec(e.to_string()))?;
        Self::decode(&bytes)
    }
}
