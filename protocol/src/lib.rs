// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # paychan: Payment Channel Client Library
//!
//! Two parties, a payer and a payee, keep a running tab off-chain and settle
//! it once on-chain. The payer locks a deposit in a settlement contract and
//! then hands out signed vouchers for ever larger cumulative amounts; the
//! payee redeems the largest one before the channel times out.
//!
//! Two pieces do the real work:
//!
//! - **voucher**: hashing, signing and verifying vouchers. Pure, no I/O,
//!   byte-compatible with the contract's `ecrecover` check.
//! - **submitter**: gets a contract call mined on a ledger that drops,
//!   underprices and re-orders transactions, by rebuilding it on the same
//!   nonce at escalating gas prices within a bounded retry budget.
//!
//! Around them:
//!
//! - **crypto**: secp256k1 keys, keccak hashing, address derivation.
//! - **ledger**: the traits a node binding implements, plus the contract's
//!   method surface.
//! - **registry**: which channel contract belongs to which (payer, payee).
//! - **channel**: Deploy, GetInfo, Timeout, Close, ExtendTime and friends.
//! - **config**: every constant in one place.
//!
//! The crate never opens a socket. Whoever embeds it supplies a
//! [`ledger::LedgerClient`] and a [`ledger::ConfirmationChecker`].

pub mod channel;
pub mod config;
pub mod crypto;
pub mod ledger;
pub mod registry;
pub mod submitter;
pub mod voucher;

pub use channel::{ChannelClient, ChannelError, ChannelInfo};
pub use crypto::ChannelKeypair;
pub use submitter::{SubmitError, SubmitOutcome, Submitter, SubmitterConfig};
pub use voucher::{sign_voucher, verify_voucher, PaymentVoucher};
