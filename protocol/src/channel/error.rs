use alloy_primitives::{Address, B256};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::registry::RegistryError;
use crate::submitter::{ConfigError, SubmitError};
use crate::voucher::VoucherError;

/// Errors surfaced by channel lifecycle operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid submitter config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The contract exists on-chain but the registry does not know it.
    /// The caller must register `address` itself or it will be orphaned.
    #[error("channel {address} was deployed but not registered: {source}")]
    RegistryInconsistency {
        address: Address,
        #[source]
        source: RegistryError,
    },

    #[error("read call failed after {attempts} attempts: {source}")]
    Read {
        attempts: u32,
        #[source]
        source: LedgerError,
    },

    #[error("unexpected return data: {0}")]
    Decode(String),

    #[error("creation {0} did not report a contract address")]
    MissingContractAddress(B256),

    /// The voucher would be rejected by the contract.
    #[error("voucher is not a valid payer signature for channel {0}")]
    InvalidVoucher(Address),

    #[error(transparent)]
    Voucher(#[from] VoucherError),
}
