//! Per-attempt submission state.
//!
//! A [`SubmissionAttempt`] is a value, not a cursor: every failure produces
//! the *next* attempt from the current one, and the engine threads that
//! value through its state machine. Nothing about an attempt is carried
//! across iterations implicitly.
//!
//! ## Escalation rule
//!
//! Once a transaction has been prepared, its nonce is fixed for the rest of
//! the submission. Each rebuild reuses that nonce and pays the previous
//! attempt's gas price plus a fixed increment, so the ledger treats it as a
//! replacement of the stuck transaction instead of a second, independent
//! mutation.
//!
//! The one exception is a `NonceTooLow` rejection while nothing this
//! submission sent at that nonce can have landed. The nonce then belongs
//! to some other transaction, so the pin is dropped and the ledger picks
//! a fresh one.

use alloy_primitives::{Address, U256};

use super::engine::Intent;
use crate::ledger::{SignedTx, TxRequest};

/// State of one attempt within a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionAttempt {
    /// 1-based attempt counter across send and confirm failures.
    pub number: u32,
    /// Nonce to sign with; `None` until a transaction has been prepared.
    pub nonce: Option<u64>,
    /// Gas price for this attempt, in wei.
    pub gas_price: U256,
    /// Send failures so far.
    pub send_retries: u32,
    /// Confirmation failures so far.
    pub confirm_retries: u32,
    /// The most recently prepared transaction, if any.
    pub last: Option<SignedTx>,
    /// Whether a transaction sent at `nonce` by this submission may already
    /// be on the ledger.
    pub maybe_landed: bool,
}

impl SubmissionAttempt {
    /// The opening attempt: ledger-assigned nonce, baseline price.
    pub fn first(base_gas_price: U256) -> Self {
        Self {
            number: 1,
            nonce: None,
            gas_price: base_gas_price,
            send_retries: 0,
            confirm_retries: 0,
            last: None,
            maybe_landed: false,
        }
    }

    /// Transaction request for this attempt.
    pub fn request(&self, from: Address, intent: &Intent, gas_limit: u64) -> TxRequest {
        TxRequest {
            from,
            target: intent.target,
            call: intent.call.clone(),
            value: intent.value,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit,
        }
    }

    /// Whether this attempt pays more than the baseline, i.e. it can only
    /// be a replacement of something sent earlier.
    pub fn is_escalated(&self, base_gas_price: U256) -> bool {
        self.gas_price > base_gas_price
    }

    /// Next attempt after a send failure. `prepared` is the transaction
    /// that failed to send, if preparing it succeeded.
    pub fn after_send_failure(&self, prepared: Option<&SignedTx>, increment: U256) -> Self {
        let next = self.escalate(prepared, increment);
        Self {
            send_retries: self.send_retries + 1,
            maybe_landed: self.maybe_landed || prepared.is_some(),
            ..next
        }
    }

    /// Next attempt after the ledger reported the nonce as used while
    /// nothing from this submission can have landed on it.
    pub fn after_stale_nonce(&self) -> Self {
        Self {
            number: self.number + 1,
            nonce: None,
            gas_price: self.gas_price,
            send_retries: self.send_retries + 1,
            confirm_retries: self.confirm_retries,
            last: None,
            maybe_landed: false,
        }
    }

    /// Next attempt after `sent` failed to confirm.
    pub fn after_confirm_failure(&self, sent: &SignedTx, increment: U256) -> Self {
        let next = self.escalate(Some(sent), increment);
        Self {
            confirm_retries: self.confirm_retries + 1,
            maybe_landed: true,
            ..next
        }
    }

    fn escalate(&self, prepared: Option<&SignedTx>, increment: U256) -> Self {
        match prepared.or(self.last.as_ref()) {
            Some(anchor) => Self {
                number: self.number + 1,
                nonce: Some(anchor.nonce),
                gas_price: anchor.gas_price.saturating_add(increment),
                send_retries: self.send_retries,
                confirm_retries: self.confirm_retries,
                last: Some(anchor.clone()),
                maybe_landed: self.maybe_landed,
            },
            // Nothing was ever prepared: there is no transaction to replace.
            None => Self {
                number: self.number + 1,
                ..self.clone()
            },
        }
    }
}
