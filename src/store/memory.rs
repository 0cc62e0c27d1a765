//! In-memory store backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Store, StoreError, StoreFactory};

type SharedMap = Arc<Mutex<HashMap<String, Vec<u8>>>>;

fn lock(map: &SharedMap) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
    map.lock().unwrap_or_else(|e| e.into_inner())
}

/// Volatile store over a shared map.
///
/// All `MemoryStore`s opened from one [`MemoryStoreFactory`] with the same
/// name view the same map, which is how two caches with the same name
/// share state in tests and single-process deployments.
pub struct MemoryStore {
    map: SharedMap,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create a private, unshared store with no quota.
    pub fn new() -> Self {
        Self {
            map: Arc::new(Mutex::new(HashMap::new())),
            quota_bytes: None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.map).get(key).cloned())
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let mut map = lock(&self.map);
        if let Some(quota) = self.quota_bytes {
            let occupied: usize = map
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if occupied + value.len() > quota {
                return Err(StoreError::QuotaExceeded);
            }
        }
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.map).remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        lock(&self.map).clear();
        Ok(())
    }
}

/// Hands out [`MemoryStore`]s that share one map per cache name.
pub struct MemoryStoreFactory {
    stores: Mutex<HashMap<String, SharedMap>>,
    quota_bytes: Option<usize>,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
            quota_bytes: None,
        }
    }

    /// Cap the aggregate value bytes per store. Writes that would exceed
    /// the cap fail with [`StoreError::QuotaExceeded`].
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            stores: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

impl Default for MemoryStoreFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFactory for MemoryStoreFactory {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError> {
        let mut stores = self.stores.lock().unwrap_or_else(|e| e.into_inner());
        let map = stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(HashMap::new())));
        Ok(Arc::new(MemoryStore {
            map: Arc::clone(map),
            quota_bytes: self.quota_bytes,
        }))
    }
}
