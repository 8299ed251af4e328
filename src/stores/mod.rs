//! Persisted shopper stores.
//!
//! Both stores keep their collection in memory and write the whole collection to
//! the key-value store after every mutation. Reads and writes fail soft: a missing
//! or corrupt value rehydrates as an empty collection, and a failed write drops the
//! store into in-memory-only mode for the rest of the session.

pub mod cart;
pub mod favorites;

pub use cart::{CartLineItem, CartStore, CartSummary};
pub use favorites::FavoritesStore;

use std::sync::Arc;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, KeyValueStore};

/// Version tag written alongside every persisted collection.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    version: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
struct Snapshot<T> {
    version: u32,
    items: Vec<T>,
}

/// One key in the key-value store holding a store's whole collection.
pub(crate) struct StoreSlot {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_failed: bool,
}

impl StoreSlot {
    pub(crate) fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            write_failed: false,
        }
    }

    pub(crate) fn is_durable(&self) -> bool {
        self.kv.is_persistent() && !self.write_failed
    }

    /// Reads the collection, treating every failure as an empty collection.
    pub(crate) fn load<T: DeserializeOwned>(&self) -> Vec<T> {
        let value = match self.kv.get(&self.key) {
            Ok(v) => v,
            Err(Error::KeyNotFound) => {
                debug!("No stored value under {}, starting empty", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read {}: {}. Starting empty", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_value::<Snapshot<T>>(value) {
            Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => snapshot.items,
            Ok(snapshot) => {
                warn!(
                    "Unsupported snapshot version {} under {}. Starting empty",
                    snapshot.version, self.key
                );
                Vec::new()
            }
            Err(e) => {
                warn!("Corrupt value under {}: {}. Starting empty", self.key, e);
                Vec::new()
            }
        }
    }

    /// Writes the whole collection. After the first failure, later writes are skipped.
    pub(crate) fn save<T: Serialize>(&mut self, items: &[T]) {
        if self.write_failed {
            debug!("Skipping write to {} (in-memory only)", self.key);
            return;
        }

        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            items,
        };
        let result = serde_json::to_value(&snapshot)
            .map_err(Error::from)
            .and_then(|value| self.kv.set(&self.key, value));

        if let Err(e) = result {
            error!(
                "Failed to persist {}: {}. Continuing in memory only",
                self.key, e
            );
            self.write_failed = true;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemStore;
    use crate::KVWriter;
    use serde_json::json;

    #[test]
    fn test_missing_key_loads_empty() {
        let slot = StoreSlot::new(Arc::new(MemStore::in_memory()), "cart-storage");
        assert!(slot.load::<u32>().is_empty());
    }

    #[test]
    fn test_round_trip_through_kv() {
        let kv = Arc::new(MemStore::in_memory());
        let mut slot = StoreSlot::new(kv.clone(), "numbers");
        slot.save(&[1u32, 2, 3]);

        let reread = StoreSlot::new(kv, "numbers");
        assert_eq!(reread.load::<u32>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_corrupt_and_unknown_version_load_empty() {
        let kv = Arc::new(MemStore::in_memory());
        kv.set("garbage", json!({"items": "nope"})).unwrap();
        kv.set("future", json!({"version": 99, "items": [1]})).unwrap();

        assert!(StoreSlot::new(kv.clone(), "garbage").load::<u32>().is_empty());
        assert!(StoreSlot::new(kv, "future").load::<u32>().is_empty());
    }

    #[test]
    fn test_in_memory_slot_is_not_durable() {
        let slot = StoreSlot::new(Arc::new(MemStore::in_memory()), "k");
        assert!(!slot.is_durable());
    }
}
