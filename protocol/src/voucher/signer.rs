//! Voucher signing and verification.
//!
//! The payer calls [`sign_voucher`] every time it wants to pay more; the
//! payee calls [`verify_voucher`] (or [`verify_voucher_from`], which also
//! pins the signer) before accepting it. Neither side touches the network.
//!
//! Vouchers are independently valid: signing a larger value does not revoke
//! earlier ones. Keeping the cumulative value non-decreasing is the payer's
//! job, and the payee should only ever redeem the largest voucher it holds.

use alloy_primitives::{Address, B256, U256};
use tracing::debug;

use super::codec::PaymentVoucher;
use super::error::VoucherError;
use super::identifier::ChannelResolver;
use crate::crypto::keys::{recover_address, verify_hash, ChannelKeypair};
use crate::crypto::voucher_hash;

/// Sign `value` for the channel named by `channel_id`.
///
/// Fails if the identifier does not resolve.
pub fn sign_voucher<R>(
    resolver: &R,
    channel_id: &str,
    value: U256,
    keypair: &ChannelKeypair,
) -> Result<PaymentVoucher, VoucherError>
where
    R: ChannelResolver + ?Sized,
{
    let channel = resolve(resolver, channel_id)?;
    let hash = voucher_hash(&channel, &value);
    let signature = keypair.sign_hash(&hash);

    Ok(PaymentVoucher {
        signature: signature.to_vec(),
        public_key: keypair.public_key_compressed().to_vec(),
        value,
        channel_id: channel_id.to_string(),
    })
}

/// Sign and immediately serialize, for callers that only ship bytes.
pub fn sign_voucher_bytes<R>(
    resolver: &R,
    channel_id: &str,
    value: U256,
    keypair: &ChannelKeypair,
) -> Result<Vec<u8>, VoucherError>
where
    R: ChannelResolver + ?Sized,
{
    sign_voucher(resolver, channel_id, value, keypair)?.encode()
}

/// Check the voucher's signature against its embedded public key.
///
/// Returns `Ok(false)` for a forged or garbled voucher, including one whose
/// channel identifier no longer resolves. Errors are reserved for structural
/// problems: a signature shorter than 64 bytes or a public key that is not
/// a curve point.
pub fn verify_voucher<R>(resolver: &R, voucher: &PaymentVoucher) -> Result<bool, VoucherError>
where
    R: ChannelResolver + ?Sized,
{
    let Some(channel) = resolver.resolve(&voucher.channel_id) else {
        debug!(channel_id = %voucher.channel_id, "voucher names an unknown channel");
        return Ok(false);
    };
    let hash = voucher.hash_for(&channel);
    Ok(verify_hash(&voucher.public_key, &hash, &voucher.signature)?)
}

/// Like [`verify_voucher`], and additionally require that the signature
/// recovers to `expected_signer` (normally the channel's payer as reported
/// by `getInfo`). The settlement contract performs the same recovery, so a
/// voucher that fails here would be rejected on-chain.
pub fn verify_voucher_from<R>(
    resolver: &R,
    voucher: &PaymentVoucher,
    expected_signer: &Address,
) -> Result<bool, VoucherError>
where
    R: ChannelResolver + ?Sized,
{
    if !verify_voucher(resolver, voucher)? {
        return Ok(false);
    }
    match voucher.recover_signer(resolver) {
        Ok(signer) => Ok(signer == *expected_signer),
        Err(VoucherError::MalformedSignature(reason)) => {
            debug!(%reason, "voucher signature is not recoverable");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

impl PaymentVoucher {
    /// The digest this voucher's signature covers when redeemed on
    /// `channel`.
    pub fn hash_for(&self, channel: &Address) -> B256 {
        voucher_hash(channel, &self.value)
    }

    /// Recover the address that produced the signature.
    pub fn recover_signer<R>(&self, resolver: &R) -> Result<Address, VoucherError>
    where
        R: ChannelResolver + ?Sized,
    {
        let channel = resolve(resolver, &self.channel_id)?;
        Ok(recover_address(&self.hash_for(&channel), &self.signature)?)
    }
}

fn resolve<R>(resolver: &R, channel_id: &str) -> Result<Address, VoucherError>
where
    R: ChannelResolver + ?Sized,
{
    resolver
        .resolve(channel_id)
        .ok_or_else(|| VoucherError::UnresolvableChannel(channel_id.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::voucher::identifier::{channel_id_for, AddressIdResolver};

    fn resolver() -> HashMap<String, Address> {
        let mut map = HashMap::new();
        map.insert("C1".to_string(), Address::repeat_byte(0xc1));
        map.insert("C2".to_string(), Address::repeat_byte(0xc2));
        map
    }

    #[test]
    fn sign_then_verify() {
        let kp = ChannelKeypair::generate();
        let voucher = sign_voucher(&resolver(), "C1", U256::from(1000u64), &kp).unwrap();
        assert_eq!(voucher.signature.len(), 65);
        assert_eq!(voucher.public_key.len(), 33);
        assert!(verify_voucher(&resolver(), &voucher).unwrap());
    }

    #[test]
    fn earlier_voucher_stays_valid_after_larger_one() {
        let kp = ChannelKeypair::generate();
        let first = sign_voucher(&resolver(), "C1", U256::from(1000u64), &kp).unwrap();
        let second = sign_voucher(&resolver(), "C1", U256::from(1500u64), &kp).unwrap();
        assert!(verify_voucher(&resolver(), &second).unwrap());
        assert!(verify_voucher(&resolver(), &first).unwrap());
    }

    #[test]
    fn unresolvable_channel_fails_signing() {
        let kp = ChannelKeypair::generate();
        let err = sign_voucher(&resolver(), "nope", U256::from(1u64), &kp).unwrap_err();
        assert!(matches!(err, VoucherError::UnresolvableChannel(id) if id == "nope"));
    }

    #[test]
    fn tampered_value_fails() {
        let kp = ChannelKeypair::generate();
        let mut voucher = sign_voucher(&resolver(), "C1", U256::from(1000u64), &kp).unwrap();
        voucher.value = U256::from(1001u64);
        assert!(!verify_voucher(&resolver(), &voucher).unwrap());
    }

    #[test]
    fn voucher_moved_to_other_channel_fails() {
        let kp = ChannelKeypair::generate();
        let mut voucher = sign_voucher(&resolver(), "C1", U256::from(1000u64), &kp).unwrap();
        voucher.channel_id = "C2".to_string();
        assert!(!verify_voucher(&resolver(), &voucher).unwrap());

        voucher.channel_id = "C3".to_string();
        assert!(!verify_voucher(&resolver(), &voucher).unwrap());
    }

    #[test]
    fn every_signature_byte_matters() {
        let kp = ChannelKeypair::generate();
        let voucher = sign_voucher(&resolver(), "C1", U256::from(42u64), &kp).unwrap();
        for i in 0..64 {
            let mut tampered = voucher.clone();
            tampered.signature[i] ^= 0x01;
            assert!(
                !verify_voucher(&resolver(), &tampered).unwrap(),
                "flipping signature byte {i} must invalidate the voucher"
            );
        }
    }

    #[test]
    fn short_signature_is_malformed() {
        let kp = ChannelKeypair::generate();
        let mut voucher = sign_voucher(&resolver(), "C1", U256::from(1u64), &kp).unwrap();
        voucher.signature.truncate(63);
        assert!(matches!(
            verify_voucher(&resolver(), &voucher),
            Err(VoucherError::MalformedSignature(_))
        ));
    }

    #[test]
    fn garbage_public_key_is_malformed() {
        let kp = ChannelKeypair::generate();
        let mut voucher = sign_voucher(&resolver(), "C1", U256::from(1u64), &kp).unwrap();
        voucher.public_key = vec![0u8; 33];
        assert!(matches!(
            verify_voucher(&resolver(), &voucher),
            Err(VoucherError::MalformedPublicKey)
        ));
    }

    #[test]
    fn recover_signer_and_pin_payer() {
        let payer = ChannelKeypair::generate();
        let stranger = ChannelKeypair::generate();
        let voucher = sign_voucher(&resolver(), "C1", U256::from(7u64), &payer).unwrap();

        assert_eq!(voucher.recover_signer(&resolver()).unwrap(), payer.address());
        assert!(verify_voucher_from(&resolver(), &voucher, &payer.address()).unwrap());
        assert!(!verify_voucher_from(&resolver(), &voucher, &stranger.address()).unwrap());
    }

    #[test]
    fn wire_bytes_verify_on_the_other_side() {
        let kp = ChannelKeypair::generate();
        let channel = Address::repeat_byte(0x99);
        let id = channel_id_for(&channel);

        let bytes = sign_voucher_bytes(&AddressIdResolver, &id, U256::from(5_000u64), &kp).unwrap();
        let received = PaymentVoucher::decode(&bytes).unwrap();
        assert!(verify_voucher(&AddressIdResolver, &received).unwrap());
        assert_eq!(received.hash_for(&channel), voucher_hash(&channel, &U256::from(5_000u64)));
    }
}
