//! # Channel Registry
//!
//! Remembers which channel contracts were deployed for a (payer, payee)
//! pair, in deployment order. The latest one is the active channel.
//!
//! - [`MemoryRegistry`]: process-local, for tests and short-lived tools.
//! - [`SledRegistry`]: persistent, one sled tree.

mod memory;
mod sled_store;

use std::fmt;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CHANNEL_KEY_SEPARATOR;

pub use memory::MemoryRegistry;
pub use sled_store::SledRegistry;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No channel was ever registered under this key.
    #[error("no channel registered for {0}")]
    NotFound(String),

    #[error("registry storage error: {0}")]
    Storage(String),

    #[error("registry serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for RegistryError {
    fn from(e: sled::Error) -> Self {
        RegistryError::Storage(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// ChannelKey
// ---------------------------------------------------------------------------

/// The (payer, payee) pair a channel is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub payer: Address,
    pub payee: Address,
}

impl ChannelKey {
    pub fn new(payer: Address, payee: Address) -> Self {
        Self { payer, payee }
    }

    /// Storage key: both checksummed addresses joined by the separator,
    /// e.g. `0xAb..12channel0xCd..34`.
    pub fn registry_key(&self) -> String {
        format!("{}{}{}", self.payer, CHANNEL_KEY_SEPARATOR, self.payee)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.registry_key())
    }
}

// ---------------------------------------------------------------------------
// Registry trait
// ---------------------------------------------------------------------------

/// Storage for channel addresses keyed by [`ChannelKey`].
///
/// Implementations must keep insertion order: `list_all` returns oldest
/// first and `resolve_latest` the most recent registration.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Every channel registered under `key`, oldest first. Empty if none.
    async fn list_all(&self, key: &ChannelKey) -> Result<Vec<Address>, RegistryError>;

    /// Append `address` to the list under `key`.
    async fn register(&self, address: Address, key: &ChannelKey) -> Result<(), RegistryError>;

    /// The most recently registered channel under `key`.
    async fn resolve_latest(&self, key: &ChannelKey) -> Result<Address, RegistryError> {
        self.list_all(key)
            .await?
            .last()
            .copied()
            .ok_or_else(|| RegistryError::NotFound(key.registry_key()))
    }
}
