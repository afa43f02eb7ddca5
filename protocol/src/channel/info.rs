//! On-chain channel state as reported by `getInfo`.

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ChannelError;
use crate::ledger::Token;

/// Decoded `getInfo()` return values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Unix timestamp (seconds) of the deployment block.
    pub start_time: u64,
    /// Channel lifetime in seconds, counted from `start_time`.
    pub timeout: u64,
    pub payer: Address,
    pub payee: Address,
}

impl ChannelInfo {
    /// Decode the `(uint256, uint256, address, address)` tuple.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self, ChannelError> {
        let [start, timeout, payer, payee] = tokens else {
            return Err(ChannelError::Decode(format!(
                "getInfo returned {} values, expected 4",
                tokens.len()
            )));
        };

        Ok(Self {
            start_time: uint_field(start, "startTime")?,
            timeout: uint_field(timeout, "timeout")?,
            payer: address_field(payer, "payer")?,
            payee: address_field(payee, "payee")?,
        })
    }

    /// Unix second from which the payer may reclaim the deposit.
    pub fn expires_at_unix(&self) -> u64 {
        self.start_time.saturating_add(self.timeout)
    }

    /// `None` if the expiry is beyond what chrono can represent.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_at_unix()).ok()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    }

    /// Whether `ChannelTimeout` would succeed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match u64::try_from(now.timestamp()) {
            Ok(now) => now >= self.expires_at_unix(),
            Err(_) => false,
        }
    }
}

fn uint_field(token: &Token, name: &str) -> Result<u64, ChannelError> {
    let value = token.as_uint().ok_or_else(|| {
        ChannelError::Decode(format!(
            "{name}: expected uint256, got {}",
            token.type_name()
        ))
    })?;
    u64::try_from(value).map_err(|_| {
        ChannelError::Decode(format!("{name}: {value} does not fit in 64 bits"))
    })
}

fn address_field(token: &Token, name: &str) -> Result<Address, ChannelError> {
    token.as_address().ok_or_else(|| {
        ChannelError::Decode(format!(
            "{name}: expected address, got {}",
            token.type_name()
        ))
    })
}
