//! # Key Management
//!
//! secp256k1 keypairs for channel participants.
//!
//! Both parties of a channel hold one of these. The payer uses it to sign
//! vouchers and to drive the contract (deploy, extend, timeout); the payee
//! uses it to submit the closing transaction. The same key also derives the
//! 20-byte account address the ledger knows the party by.
//!
//! ## Signature layout
//!
//! Signatures are 65 bytes: `r ‖ s ‖ v` with `v ∈ {0, 1}`, the layout the
//! settlement contract's recovery helper expects. Verification only looks at
//! the first 64 bytes; recovery needs all 65.
//!
//! ## Security considerations
//!
//! - Key generation uses `OsRng`.
//! - `ChannelKeypair` does not implement `Serialize` and its `Debug` output
//!   only shows the address. Exporting the secret is always an explicit call.
//! - Key bytes are never logged.

use std::fmt;
use std::sync::OnceLock;

use alloy_primitives::{keccak256, Address, B256};
use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use crate::config::{
    COMPACT_SIGNATURE_LENGTH, COMPRESSED_PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
};

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: expected 32 bytes encoding a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid secp256k1 point")]
    InvalidPublicKey,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// Shared signing/verification context. Building one precomputes tables, so
/// we do it once per process.
fn secp() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// A channel participant's signing identity.
///
/// ```
/// use paychan_protocol::crypto::keys::ChannelKeypair;
/// use alloy_primitives::B256;
///
/// let kp = ChannelKeypair::generate();
/// let sig = kp.sign_hash(&B256::repeat_byte(7));
/// assert_eq!(sig.len(), 65);
/// ```
#[derive(Clone)]
pub struct ChannelKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl ChannelKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        let (secret, public) = secp().generate_keypair(&mut OsRng);
        Self { secret, public }
    }

    /// Reconstruct a keypair from raw secret key bytes.
    pub fn from_bytes(secret_key_bytes: &[u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        let secret =
            SecretKey::from_slice(secret_key_bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let public = PublicKey::from_secret_key(secp(), &secret);
        Ok(Self { secret, public })
    }

    /// Reconstruct a keypair from a hex-encoded secret key, with or without
    /// a `0x` prefix. This is the format wallets export.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        let arr: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&arr)
    }

    /// The 33-byte compressed public key carried inside vouchers.
    pub fn public_key_compressed(&self) -> [u8; COMPRESSED_PUBLIC_KEY_LENGTH] {
        self.public.serialize()
    }

    /// The account address derived from this key.
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public)
    }

    /// Sign a 32-byte digest, returning `r ‖ s ‖ v`.
    ///
    /// The digest is signed as-is: no Ethereum message prefix is applied,
    /// because the contract recomputes the raw keccak hash on-chain.
    pub fn sign_hash(&self, hash: &B256) -> [u8; SIGNATURE_LENGTH] {
        let msg = Message::from_digest(hash.0);
        let recoverable = secp().sign_ecdsa_recoverable(&msg, &self.secret);
        let (recovery_id, compact) = recoverable.serialize_compact();

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..COMPACT_SIGNATURE_LENGTH].copy_from_slice(&compact);
        out[COMPACT_SIGNATURE_LENGTH] = recovery_id.to_i32() as u8;
        out
    }

    /// Export the raw secret key. Handle with care.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.secret.secret_bytes()
    }

    /// Hex-encoded secret key (no prefix).
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key_bytes())
    }
}

impl fmt::Debug for ChannelKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derive an account address: the last 20 bytes of the keccak-256 hash of
/// the uncompressed public key without its `0x04` prefix.
pub fn address_from_public_key(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);
    Address::from_slice(&digest[12..])
}

/// Verify the compact part of `signature` over `hash` against a SEC1
/// encoded public key.
///
/// Returns `Ok(false)` for a well-formed but wrong signature. Errors are
/// reserved for inputs that cannot be interpreted at all.
pub fn verify_hash(public_key: &[u8], hash: &B256, signature: &[u8]) -> Result<bool, KeyError> {
    let public = PublicKey::from_slice(public_key).map_err(|_| KeyError::InvalidPublicKey)?;
    if signature.len() < COMPACT_SIGNATURE_LENGTH {
        return Err(KeyError::MalformedSignature(format!(
            "expected at least {} bytes, got {}",
            COMPACT_SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    // r or s outside the curve order is just a bad signature.
    let Ok(sig) = Signature::from_compact(&signature[..COMPACT_SIGNATURE_LENGTH]) else {
        return Ok(false);
    };

    let msg = Message::from_digest(hash.0);
    Ok(secp().verify_ecdsa(&msg, &sig, &public).is_ok())
}

/// Recover the signer's address from a 65-byte recoverable signature.
///
/// Accepts both `v ∈ {0, 1}` and the legacy `v ∈ {27, 28}` encoding.
pub fn recover_address(hash: &B256, signature: &[u8]) -> Result<Address, KeyError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(KeyError::MalformedSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            signature.len()
        )));
    }

    let v = signature[COMPACT_SIGNATURE_LENGTH];
    let v = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_i32(i32::from(v))
        .map_err(|e| KeyError::MalformedSignature(format!("recovery id: {e}")))?;
    let recoverable =
        RecoverableSignature::from_compact(&signature[..COMPACT_SIGNATURE_LENGTH], recovery_id)
            .map_err(|e| KeyError::MalformedSignature(e.to_string()))?;

    let msg = Message::from_digest(hash.0);
    let public = secp()
        .recover_ecdsa(&msg, &recoverable)
        .map_err(|e| KeyError::MalformedSignature(e.to_string()))?;
    Ok(address_from_public_key(&public))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known hardhat/anvil account #0.
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn address_derivation_matches_known_account() {
        let kp = ChannelKeypair::from_hex(DEV_KEY).unwrap();
        let expected: Address = DEV_ADDRESS.parse().unwrap();
        assert_eq!(kp.address(), expected);
    }

    #[test]
    fn from_hex_accepts_prefix() {
        let a = ChannelKeypair::from_hex(DEV_KEY).unwrap();
        let b = ChannelKeypair::from_hex(&format!("0x{DEV_KEY}")).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(ChannelKeypair::from_hex("not hex").is_err());
        assert!(ChannelKeypair::from_hex("abcd").is_err());
        // Zero is not a valid scalar.
        assert!(ChannelKeypair::from_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn hex_roundtrip_preserves_identity() {
        let kp = ChannelKeypair::generate();
        let restored = ChannelKeypair::from_hex(&kp.secret_key_hex()).unwrap();
        assert_eq!(kp.address(), restored.address());
        assert_eq!(kp.public_key_compressed(), restored.public_key_compressed());
    }

    #[test]
    fn sign_then_verify() {
        let kp = ChannelKeypair::generate();
        let hash = keccak256(b"pay 10 wei");
        let sig = kp.sign_hash(&hash);
        assert!(sig[64] <= 1);
        assert!(verify_hash(&kp.public_key_compressed(), &hash, &sig).unwrap());
    }

    #[test]
    fn verify_rejects_other_hash() {
        let kp = ChannelKeypair::generate();
        let sig = kp.sign_hash(&keccak256(b"a"));
        assert!(!verify_hash(&kp.public_key_compressed(), &keccak256(b"b"), &sig).unwrap());
    }

    #[test]
    fn verify_short_signature_is_an_error() {
        let kp = ChannelKeypair::generate();
        let result = verify_hash(&kp.public_key_compressed(), &B256::ZERO, &[0u8; 10]);
        assert!(matches!(result, Err(KeyError::MalformedSignature(_))));
    }

    #[test]
    fn verify_bad_public_key_is_an_error() {
        let result = verify_hash(&[0u8; 33], &B256::ZERO, &[0u8; 65]);
        assert!(matches!(result, Err(KeyError::InvalidPublicKey)));
    }

    #[test]
    fn recover_returns_signer_address() {
        let kp = ChannelKeypair::generate();
        let hash = keccak256(b"recover me");
        let mut sig = kp.sign_hash(&hash);
        assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());

        // Legacy v encoding.
        sig[64] += 27;
        assert_eq!(recover_address(&hash, &sig).unwrap(), kp.address());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = ChannelKeypair::from_hex(DEV_KEY).unwrap();
        let rendered = format!("{kp:?}");
        assert!(!rendered.contains(DEV_KEY));
    }
}
