//! Error types reported by ledger collaborators.
//!
//! Adapters classify node responses into these kinds once, at the edge.
//! Everything downstream branches on the variant, never on message text.

use alloy_primitives::B256;
use thiserror::Error;

/// A failed ledger RPC call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The account has already used this nonce.
    #[error("nonce too low: {0}")]
    NonceTooLow(String),

    /// Gas price below what the node (or a pending replacement) requires.
    #[error("transaction underpriced: {0}")]
    Underpriced(String),

    /// The account cannot pay for gas plus attached value.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The node could not be reached or timed out.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other rejection by the node.
    #[error("rejected by node: {0}")]
    Rejected(String),

    /// The signing key could not be used.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    /// Return data did not match the expected ABI shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl LedgerError {
    pub fn is_nonce_too_low(&self) -> bool {
        matches!(self, LedgerError::NonceTooLow(_))
    }

    /// Short stable name of the variant, for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NonceTooLow(_) => "nonce_too_low",
            LedgerError::Underpriced(_) => "underpriced",
            LedgerError::InsufficientFunds(_) => "insufficient_funds",
            LedgerError::Transport(_) => "transport",
            LedgerError::Rejected(_) => "rejected",
            LedgerError::InvalidKey(_) => "invalid_key",
            LedgerError::Decode(_) => "decode",
        }
    }
}

/// Why a sent transaction did not confirm.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationFailure {
    /// Mined, but execution reverted.
    #[error("transaction {0} reverted")]
    Reverted(B256),

    /// Not mined within the checker's patience.
    #[error("transaction {0} not mined in time")]
    TimedOut(B256),

    /// Evicted from the mempool.
    #[error("transaction {0} dropped from the mempool")]
    Dropped(B256),

    /// The checker itself failed to talk to the ledger.
    #[error("confirmation check failed: {0}")]
    Ledger(#[from] LedgerError),
}
