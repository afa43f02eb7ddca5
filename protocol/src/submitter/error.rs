use alloy_primitives::Address;
use thiserror::Error;

use crate::ledger::{ConfirmationFailure, LedgerError};

/// The failure that used up the last retry of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("send failed: {0}")]
    Send(LedgerError),

    #[error("confirmation failed: {0}")]
    Confirm(ConfirmationFailure),
}

/// Why a submission ended without a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The signer could not be used at all. Retrying cannot help.
    #[error("cannot build signing context: {0}")]
    SigningContext(String),

    /// Send or confirmation retries ran out.
    #[error("retry budget exhausted after {attempts} attempts (nonce {nonce:?}): {last}")]
    RetryBudgetExhausted {
        attempts: u32,
        /// The nonce the submission was pinned to, if it got that far.
        nonce: Option<u64>,
        #[source]
        last: AttemptFailure,
    },

    /// A held sequencer slot belongs to a different signer.
    #[error("sequencer slot held for {held}, not for signer {signer}")]
    SlotMismatch { held: Address, signer: Address },
}

impl SubmitError {
    /// The failure behind an exhausted budget.
    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        match self {
            SubmitError::RetryBudgetExhausted { last, .. } => Some(last),
            SubmitError::SigningContext(_) | SubmitError::SlotMismatch { .. } => None,
        }
    }
}
