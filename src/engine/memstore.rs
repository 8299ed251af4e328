use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::{Result, Error, KVReader, KVWriter, KeyValueStore};
use crate::engine::Persistence;

type StoreData = HashMap<String, serde_json::Value>;

/// In-memory key-value store with optional write-through [`Persistence`].
///
/// Every `set`/`delete` holds the write lock while the affected key is written to
/// disk, so memory and disk see writes to a key in the same order.
pub struct MemStore {
    data: RwLock<StoreData>,
    persistence: Option<Arc<Persistence>>,
}

impl MemStore {
    pub fn new(initial_data: StoreData, persistence: Option<Arc<Persistence>>) -> Self {
        Self {
            data: RwLock::new(initial_data),
            persistence,
        }
    }

    /// Opens a store backed by `persistence`, loading every readable key.
    pub fn open(persistence: Arc<Persistence>) -> Result<Self> {
        let initial_data = persistence.load_all()?;
        log::info!(
            "Loaded {} keys from {:?}",
            initial_data.len(),
            persistence.data_dir()
        );
        Ok(Self::new(initial_data, Some(persistence)))
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(HashMap::new(), None)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreData>> {
        self.data
            .read()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreData>> {
        self.data
            .write()
            .map_err(|_| Error::Internal("store lock poisoned".to_string()))
    }
}

impl KVReader for MemStore {
    fn get(&self, key: &str) -> Result<serde_json::Value> {
        let data = self.read()?;
        data.get(key).cloned().ok_or(Error::KeyNotFound)
    }
}

impl KVWriter for MemStore {
    fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut data = self.write()?;
        if let Some(p) = &self.persistence {
            p.save_key(key, &value)?;
        }
        data.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut data = self.write()?;
        if let Some(p) = &self.persistence {
            p.delete_key(key)?;
        }
        data.remove(key);
        Ok(())
    }
}

impl KeyValueStore for MemStore {
    fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_memstore_get_set() {
        let store = MemStore::in_memory();
        store.set("k1", json!("v1")).unwrap();

        let val = store.get("k1").unwrap();
        assert_eq!(val, json!("v1"));
        assert!(!store.is_persistent());
    }

    #[test]
    fn test_memstore_delete() {
        let store = MemStore::in_memory();
        store.set("k1", json!("v1")).unwrap();
        store.delete("k1").unwrap();

        let res = store.get("k1");
        assert!(matches!(res, Err(Error::KeyNotFound)));
    }

    #[test]
    fn test_concurrent_writers_agree_with_disk() {
        let dir = tempdir().unwrap();
        let store = Arc::new(MemStore::open(Arc::new(Persistence::new(dir.path()).unwrap())).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.set("cart-storage", json!({"writer": t, "seq": i})).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let in_memory = store.get("cart-storage").unwrap();
        let reopened = MemStore::open(Arc::new(Persistence::new(dir.path()).unwrap())).unwrap();
        assert_eq!(reopened.get("cart-storage").unwrap(), in_memory);
    }

    #[test]
    fn test_write_through_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = MemStore::open(Arc::new(Persistence::new(dir.path()).unwrap())).unwrap();
            store.set("cart-storage", json!({"version": 1, "items": []})).unwrap();
            assert!(store.is_persistent());
        }

        let reopened = MemStore::open(Arc::new(Persistence::new(dir.path()).unwrap())).unwrap();
        assert_eq!(reopened.get("cart-storage").unwrap(), json!({"version": 1, "items": []}));
    }

    #[test]
    fn test_failed_write_leaves_memory_untouched() {
        let dir = tempdir().unwrap();
        let store = MemStore::open(Arc::new(Persistence::new(dir.path()).unwrap())).unwrap();

        assert!(store.set("bad/key", json!(1)).is_err());
        assert!(matches!(store.get("bad/key"), Err(Error::KeyNotFound)));
    }
}
