//! # Ledger Interfaces
//!
//! The boundary between the channel client and the chain. Nothing in here
//! talks to a node; it defines what the submitter and lifecycle operations
//! need from whoever does.
//!
//! - `contract.rs`: the settlement contract's methods and call builders.
//! - `types.rs`: tokens, transaction requests, signed transactions, receipts.
//! - `client.rs`: [`LedgerClient`] and [`ConfirmationChecker`].
//! - `error.rs`: [`LedgerError`] and [`ConfirmationFailure`].
//! - `scripted.rs`: [`ScriptedLedger`], an in-memory stand-in for tests.

pub mod client;
pub mod contract;
pub mod scripted;
pub mod types;

mod error;

pub use client::{ConfirmationChecker, LedgerClient};
pub use contract::{ChannelMethod, ContractCall};
pub use error::{ConfirmationFailure, LedgerError};
pub use scripted::{LedgerEvent, ScriptedLedger};
pub use types::{Receipt, SignedTx, Token, TxRequest, TxTarget};
