//! Error types for voucher signing, verification and decoding.

use thiserror::Error;

use crate::crypto::KeyError;

/// Errors that can occur while producing or interpreting a voucher.
///
/// A voucher whose signature simply doesn't match is *not* an error; see
/// [`verify_voucher`](super::verify_voucher).
#[derive(Debug, Error)]
pub enum VoucherError {
    /// The channel identifier does not name a channel address.
    #[error("cannot resolve channel identifier {0:?} to a channel address")]
    UnresolvableChannel(String),

    /// The signing key is malformed.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// The signature is too short or otherwise structurally broken.
    #[error("malformed voucher signature: {0}")]
    MalformedSignature(String),

    /// The embedded public key is not a secp256k1 point.
    #[error("malformed voucher public key")]
    MalformedPublicKey,

    /// The value does not fit in a 256-bit word.
    #[error("voucher value is {0} bytes wide, at most 32 are allowed")]
    ValueTooLarge(usize),

    /// The wire bytes could not be encoded or decoded.
    #[error("voucher codec error: {0}")]
    Codec(String),
}

impl From<KeyError> for VoucherError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidSecretKey => VoucherError::InvalidKey(err.to_string()),
            KeyError::InvalidPublicKey => VoucherError::MalformedPublicKey,
            KeyError::MalformedSignature(reason) => VoucherError::MalformedSignature(reason),
        }
    }
}
