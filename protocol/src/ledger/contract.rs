//! The settlement contract's method surface.
//!
//! The contract itself is opaque to us: we only need its method names,
//! argument shapes and selectors to hand typed calls to the binding layer.
//! Selectors are derived from the canonical Solidity signatures at runtime
//! and pinned by tests against the deployed ABI.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::types::Token;
use crate::crypto::function_selector;

/// Every entry point of the channel contract the client drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelMethod {
    /// `constructor(address payee, uint256 timeout)`, payable.
    Constructor,
    /// `getInfo() view returns (uint256, uint256, address, address)`.
    GetInfo,
    /// `ChannelTimeout()`: payer reclaims the deposit after expiry.
    ChannelTimeout,
    /// `CloseChannel(bytes32 hash, uint256 value, bytes sign)`, payable.
    CloseChannel,
    /// `extend(uint256 addTime)`.
    Extend,
    /// `getOwner() view returns (address)`.
    GetOwner,
    /// `alterOwner(address newOwner) returns (bool)`.
    AlterOwner,
}

impl ChannelMethod {
    /// Method name as it appears in the ABI.
    pub fn name(self) -> &'static str {
        match self {
            ChannelMethod::Constructor => "constructor",
            ChannelMethod::GetInfo => "getInfo",
            ChannelMethod::ChannelTimeout => "ChannelTimeout",
            ChannelMethod::CloseChannel => "CloseChannel",
            ChannelMethod::Extend => "extend",
            ChannelMethod::GetOwner => "getOwner",
            ChannelMethod::AlterOwner => "alterOwner",
        }
    }

    /// Canonical signature used for selector derivation.
    pub fn signature(self) -> &'static str {
        match self {
            ChannelMethod::Constructor => "constructor(address,uint256)",
            ChannelMethod::GetInfo => "getInfo()",
            ChannelMethod::ChannelTimeout => "ChannelTimeout()",
            ChannelMethod::CloseChannel => "CloseChannel(bytes32,uint256,bytes)",
            ChannelMethod::Extend => "extend(uint256)",
            ChannelMethod::GetOwner => "getOwner()",
            ChannelMethod::AlterOwner => "alterOwner(address)",
        }
    }

    /// 4-byte function selector. Constructors have none.
    pub fn selector(self) -> Option<[u8; 4]> {
        match self {
            ChannelMethod::Constructor => None,
            other => Some(function_selector(other.signature())),
        }
    }
}

impl fmt::Display for ChannelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A method together with its typed arguments, ready for the binding layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    /// The method being invoked.
    pub method: ChannelMethod,
    /// Arguments in ABI order.
    pub args: Vec<Token>,
}

impl ContractCall {
    /// Constructor arguments for a new channel.
    pub fn deploy(payee: Address, timeout_secs: U256) -> Self {
        Self {
            method: ChannelMethod::Constructor,
            args: vec![Token::Address(payee), Token::Uint(timeout_secs)],
        }
    }

    pub fn get_info() -> Self {
        Self {
            method: ChannelMethod::GetInfo,
            args: Vec::new(),
        }
    }

    pub fn channel_timeout() -> Self {
        Self {
            method: ChannelMethod::ChannelTimeout,
            args: Vec::new(),
        }
    }

    /// Settlement call carrying the voucher hash, value and signature.
    pub fn close_channel(hash: B256, value: U256, signature: Vec<u8>) -> Self {
        Self {
            method: ChannelMethod::CloseChannel,
            args: vec![
                Token::FixedBytes(hash),
                Token::Uint(value),
                Token::Bytes(signature),
            ],
        }
    }

    pub fn extend(additional_secs: U256) -> Self {
        Self {
            method: ChannelMethod::Extend,
            args: vec![Token::Uint(additional_secs)],
        }
    }

    pub fn get_owner() -> Self {
        Self {
            method: ChannelMethod::GetOwner,
            args: Vec::new(),
        }
    }

    pub fn alter_owner(new_owner: Address) -> Self {
        Self {
            method: ChannelMethod::AlterOwner,
            args: vec![Token::Address(new_owner)],
        }
    }
}
