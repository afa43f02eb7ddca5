//! Collaborator traits for the ledger.
//!
//! The RPC client, ABI binding and receipt polling live outside this crate.
//! These traits are the whole contract between them and the submitter.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use super::contract::ContractCall;
use super::error::{ConfirmationFailure, LedgerError};
use super::types::{Receipt, SignedTx, Token, TxRequest};
use crate::crypto::ChannelKeypair;

/// A ledger RPC endpoint with a contract binding on top.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Execute a read-only call and decode its return values.
    async fn call(
        &self,
        from: Address,
        to: Address,
        call: &ContractCall,
    ) -> Result<Vec<Token>, LedgerError>;

    /// Build the signing context for `request` and sign it.
    ///
    /// Fills in the nonce when `request.nonce` is `None`. For creations the
    /// returned transaction carries the future contract address.
    async fn prepare(
        &self,
        request: &TxRequest,
        signer: &ChannelKeypair,
    ) -> Result<SignedTx, LedgerError>;

    /// Broadcast a signed transaction, returning the hash the node accepted
    /// it under.
    async fn send(&self, tx: &SignedTx) -> Result<B256, LedgerError>;
}

/// Waits for a sent transaction to be mined.
#[async_trait]
pub trait ConfirmationChecker: Send + Sync {
    /// Resolves once the ledger has mined `tx`: `Ok` if it executed, an
    /// error if it reverted, was dropped, or did not show up in time.
    async fn wait_mined(&self, tx: &SignedTx) -> Result<Receipt, ConfirmationFailure>;
}
