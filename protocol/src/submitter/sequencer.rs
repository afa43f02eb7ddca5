//! Per-identity serialization of submissions.
//!
//! Two submissions signed by the same key must never interleave: the
//! second one would grab the nonce the first is still trying to land, and
//! the gas-escalation logic of both would start fighting. The sequencer
//! hands out one async lock per signer address. Different signers proceed
//! in parallel.
//!
//! Submitters share [`NonceSequencer::global`] unless told otherwise, so
//! two clients built independently for the same key still take turns.

use std::sync::{Arc, OnceLock};

use alloy_primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out exclusive submission slots keyed by signer address.
///
/// Cheap to clone; clones share the same slots. Submitters that sign for
/// the same identity only serialize if they hold the same sequencer.
#[derive(Clone, Default)]
pub struct NonceSequencer {
    slots: Arc<DashMap<Address, Arc<Mutex<()>>>>,
}

/// Held for the whole duration of one submission.
pub struct IdentityGuard {
    identity: Address,
    _slot: OwnedMutexGuard<()>,
}

impl IdentityGuard {
    pub fn identity(&self) -> Address {
        self.identity
    }
}

static GLOBAL: OnceLock<NonceSequencer> = OnceLock::new();

impl NonceSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide sequencer every [`Submitter`](super::Submitter)
    /// starts with.
    pub fn global() -> Self {
        GLOBAL.get_or_init(NonceSequencer::default).clone()
    }

    /// Waits until no other submission for `identity` is in flight.
    pub async fn acquire(&self, identity: Address) -> IdentityGuard {
        // Clone the slot out so the map shard is not locked across the await.
        let slot = {
            let entry = self
                .slots
                .entry(identity)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        IdentityGuard {
            identity,
            _slot: slot.lock_owned().await,
        }
    }

    /// Whether a submission for `identity` currently holds its slot.
    pub fn is_busy(&self, identity: &Address) -> bool {
        self.slots
            .get(identity)
            .map(|slot| slot.try_lock().is_err())
            .unwrap_or(false)
    }
}
