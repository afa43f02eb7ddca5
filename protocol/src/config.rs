//! # Protocol Configuration & Constants
//!
//! Every magic number in the channel client lives here. If you're hardcoding
//! a gas price or a retry bound somewhere else, move it here.
//!
//! The submission defaults are tuned for a public EVM chain where blocks
//! arrive every ~15 seconds and RPC nodes are flaky more often than they
//! are down. Private devnets will want much shorter backoffs.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Gas & Fees
// ---------------------------------------------------------------------------

/// Wei per gwei.
pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Baseline gas price (wei) for the first attempt of every submission.
pub const DEFAULT_GAS_PRICE_WEI: u64 = 2 * WEI_PER_GWEI;

/// Amount (wei) added to the gas price of the previous attempt every time a
/// submission is rebuilt. Equal to the baseline, so attempt `k` pays
/// `(k + 1) * base`.
pub const GAS_PRICE_INCREMENT_WEI: u64 = DEFAULT_GAS_PRICE_WEI;

/// Gas limit attached to every channel transaction. Deploying the channel
/// contract is by far the most expensive call; everything else fits easily.
pub const DEFAULT_GAS_LIMIT: u64 = 8_000_000;

// ---------------------------------------------------------------------------
// Retry Bounds
// ---------------------------------------------------------------------------

/// Send failures tolerated before a submission gives up. A submission makes
/// at most `SEND_RETRY_LIMIT + 1` send attempts.
pub const SEND_RETRY_LIMIT: u32 = 5;

/// Confirmation failures tolerated before a submission gives up.
pub const CONFIRM_RETRY_LIMIT: u32 = 8;

/// Failed read calls (`getInfo`, `getOwner`) tolerated before giving up.
pub const READ_RETRY_LIMIT: u32 = SEND_RETRY_LIMIT;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Pause after a rejected send before rebuilding the transaction. Long
/// enough for a block or two to land, which is usually what a stuck nonce
/// is waiting for.
pub const RETRY_TX_BACKOFF: Duration = Duration::from_secs(60);

/// Pause between failed read calls.
pub const RETRY_READ_BACKOFF: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Infix joining payer and payee addresses into a registry key.
pub const CHANNEL_KEY_SEPARATOR: &str = "channel";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 secret key length in bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Compressed secp256k1 public key length (SEC1, 0x02/0x03 prefix).
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Recoverable signature length: `r ‖ s ‖ v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Compact signature length (`r ‖ s`), the part checked by verification.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// Account / contract address length.
pub const ADDRESS_LENGTH: usize = 20;

/// Keccak-256 digest length, also the width of an EVM word.
pub const HASH_OUTPUT_LENGTH: usize = 32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_increment_is_positive() {
        // A zero increment would make every replacement identical to the
        // transaction it is supposed to replace.
        assert!(GAS_PRICE_INCREMENT_WEI > 0);
        assert!(DEFAULT_GAS_PRICE_WEI > 0);
    }

    #[test]
    fn test_read_backoff_shorter_than_tx_backoff() {
        assert!(RETRY_READ_BACKOFF < RETRY_TX_BACKOFF);
    }

    #[test]
    fn test_crypto_parameter_sizes() {
        assert_eq!(SECRET_KEY_LENGTH, 32);
        assert_eq!(COMPRESSED_PUBLIC_KEY_LENGTH, 33);
        assert_eq!(SIGNATURE_LENGTH, COMPACT_SIGNATURE_LENGTH + 1);
        assert_eq!(ADDRESS_LENGTH, 20);
        assert_eq!(HASH_OUTPUT_LENGTH, 32);
    }
}
