//! # Payment Vouchers
//!
//! Off-chain authorization of channel payments. A voucher binds a channel
//! and a cumulative value to the payer's signature; the payee redeems the
//! largest one it holds when closing the channel.
//!
//! ```text
//!   ┌──────────┐   voucher(value = 1000)   ┌──────────┐
//!   │  Payer   ├──────────────────────────►│  Payee   │
//!   │          │   voucher(value = 1500)   │          │
//!   │          ├──────────────────────────►│ verify,  │
//!   └──────────┘                           │ keep max │
//!                                          └────┬─────┘
//!                                               │ CloseChannel(hash, 1500, sig)
//!                                               ▼
//!                                          settlement contract
//! ```
//!
//! - `identifier.rs`: channel identifier ↔ address resolution.
//! - `codec.rs`: the voucher type and its wire format.
//! - `signer.rs`: signing, verification and signer recovery.

pub mod codec;
pub mod identifier;
pub mod signer;

mod error;

pub use codec::PaymentVoucher;
pub use error::VoucherError;
pub use identifier::{channel_id_for, parse_channel_id, AddressIdResolver, ChannelResolver};
pub use signer::{sign_voucher, sign_voucher_bytes, verify_voucher, verify_voucher_from};
