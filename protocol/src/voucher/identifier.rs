//! Channel identifiers.
//!
//! Vouchers name their channel by a string identifier rather than a raw
//! address, so that the payee can route them before looking anything up.
//! The default resolver understands two spellings of the same address:
//!
//! - `0x`-prefixed hex, as printed by every Ethereum tool;
//! - base58 of the 20 raw address bytes, the compact form
//!   [`channel_id_for`] emits.
//!
//! Deployments that key channels differently implement
//! [`ChannelResolver`] themselves.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::config::ADDRESS_LENGTH;

/// Maps a channel identifier to the address of its settlement contract.
pub trait ChannelResolver: Send + Sync {
    /// Returns `None` when the identifier does not name a channel.
    fn resolve(&self, channel_id: &str) -> Option<Address>;
}

/// Resolver that decodes the address straight out of the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressIdResolver;

impl ChannelResolver for AddressIdResolver {
    fn resolve(&self, channel_id: &str) -> Option<Address> {
        parse_channel_id(channel_id)
    }
}

impl ChannelResolver for HashMap<String, Address> {
    fn resolve(&self, channel_id: &str) -> Option<Address> {
        self.get(channel_id).copied()
    }
}

/// Decode a hex or base58 channel identifier.
pub fn parse_channel_id(channel_id: &str) -> Option<Address> {
    let id = channel_id.trim();
    if let Some(hex_part) = id.strip_prefix("0x").or_else(|| id.strip_prefix("0X")) {
        let bytes = hex::decode(hex_part).ok()?;
        return (bytes.len() == ADDRESS_LENGTH).then(|| Address::from_slice(&bytes));
    }

    let bytes = bs58::decode(id).into_vec().ok()?;
    (bytes.len() == ADDRESS_LENGTH).then(|| Address::from_slice(&bytes))
}

/// The canonical (base58) identifier for a channel address.
pub fn channel_id_for(address: &Address) -> String {
    bs58::encode(address.as_slice()).into_string()
}
