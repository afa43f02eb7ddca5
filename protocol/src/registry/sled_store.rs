//! Persistent registry on sled.
//!
//! | Tree       | Key                        | Value                  |
//! |------------|----------------------------|------------------------|
//! | `channels` | `ChannelKey::registry_key` | `bincode(Vec<Address>)`|
//!
//! Appends run inside a sled transaction, so two concurrent registrations
//! under the same key both land.

use std::path::Path;

use alloy_primitives::Address;
use async_trait::async_trait;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use sled::{Db, Tree};

use super::{ChannelKey, Registry, RegistryError};

const CHANNELS_TREE: &str = "channels";

#[derive(Debug, Clone)]
pub struct SledRegistry {
    db: Db,
    channels: Tree,
}

impl SledRegistry {
    /// Open or create a registry database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        Self::from_db(sled::open(path)?)
    }

    /// In-memory database, removed on drop.
    pub fn open_temporary() -> Result<Self, RegistryError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, RegistryError> {
        let channels = db.open_tree(CHANNELS_TREE)?;
        Ok(Self { db, channels })
    }

    /// Every registry key currently stored.
    pub fn keys(&self) -> Result<Vec<String>, RegistryError> {
        self.channels
            .iter()
            .keys()
            .map(|k| {
                let k = k?;
                String::from_utf8(k.to_vec())
                    .map_err(|e| RegistryError::Serialization(e.to_string()))
            })
            .collect()
    }
}

fn decode(bytes: &[u8]) -> Result<Vec<Address>, RegistryError> {
    bincode::deserialize(bytes).map_err(|e| RegistryError::Serialization(e.to_string()))
}

fn encode(list: &[Address]) -> Result<Vec<u8>, RegistryError> {
    bincode::serialize(list).map_err(|e| RegistryError::Serialization(e.to_string()))
}

#[async_trait]
impl Registry for SledRegistry {
    async fn list_all(&self, key: &ChannelKey) -> Result<Vec<Address>, RegistryError> {
        match self.channels.get(key.registry_key().as_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Ok(Vec::new()),
        }
    }

    async fn register(&self, address: Address, key: &ChannelKey) -> Result<(), RegistryError> {
        let storage_key = key.registry_key();

        self.channels
            .transaction(|tx| -> ConflictableTransactionResult<(), RegistryError> {
                let mut list = match tx.get(storage_key.as_bytes())? {
                    Some(bytes) => decode(&bytes).map_err(ConflictableTransactionError::Abort)?,
                    None => Vec::new(),
                };
                list.push(address);
                let bytes = encode(&list).map_err(ConflictableTransactionError::Abort)?;
                tx.insert(storage_key.as_bytes(), bytes)?;
                Ok(())
            })
            .map_err(|e| match e {
                TransactionError::Abort(e) => e,
                TransactionError::Storage(e) => RegistryError::from(e),
            })?;

        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ChannelKey {
        ChannelKey::new(Address::repeat_byte(1), Address::repeat_byte(2))
    }

    #[tokio::test]
    async fn empty_key_is_not_found() {
        let reg = SledRegistry::open_temporary().unwrap();
        assert!(reg.list_all(&key()).await.unwrap().is_empty());
        assert_eq!(
            reg.resolve_latest(&key()).await,
            Err(RegistryError::NotFound(key().registry_key()))
        );
    }

    #[tokio::test]
    async fn appends_in_order() {
        let reg = SledRegistry::open_temporary().unwrap();
        for b in 1..=3u8 {
            reg.register(Address::repeat_byte(0xa0 + b), &key()).await.unwrap();
        }
        assert_eq!(reg.list_all(&key()).await.unwrap().len(), 3);
        assert_eq!(reg.resolve_latest(&key()).await.unwrap(), Address::repeat_byte(0xa3));
        assert_eq!(reg.keys().unwrap(), vec![key().registry_key()]);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry");
        {
            let reg = SledRegistry::open(&path).unwrap();
            reg.register(Address::repeat_byte(0xbb), &key()).await.unwrap();
        }
        let reg = SledRegistry::open(&path).unwrap();
        assert_eq!(reg.resolve_latest(&key()).await.unwrap(), Address::repeat_byte(0xbb));
    }

    #[tokio::test]
    async fn corrupt_value_is_a_serialization_error() {
        let reg = SledRegistry::open_temporary().unwrap();
        reg.channels
            .insert(key().registry_key().as_bytes(), &[0xffu8, 0xff][..])
            .unwrap();
        assert!(matches!(
            reg.list_all(&key()).await,
            Err(RegistryError::Serialization(_))
        ));
    }
}
