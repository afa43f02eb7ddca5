use std::collections::HashMap;

use alloy_primitives::Address;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ChannelKey, Registry, RegistryError};

/// Registry kept in a map behind a lock. Lost on drop.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    channels: RwLock<HashMap<String, Vec<Address>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn list_all(&self, key: &ChannelKey) -> Result<Vec<Address>, RegistryError> {
        Ok(self
            .channels
            .read()
            .get(&key.registry_key())
            .cloned()
            .unwrap_or_default())
    }

    async fn register(&self, address: Address, key: &ChannelKey) -> Result<(), RegistryError> {
        self.channels
            .write()
            .entry(key.registry_key())
            .or_default()
            .push(address);
        Ok(())
    }
}
