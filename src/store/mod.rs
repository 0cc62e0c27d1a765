//! Local persistence backends.
//!
//! The cache persists serialized pages and a versioned settings record
//! through the [`Store`] trait. Backends form a small closed set selected
//! by [`StoreMechanism`]; a custom [`StoreFactory`] can be injected through
//! the builder instead (this is also the fault-injection seam the tests
//! use — never process-global state).
//!
//! The cache core is the only writer. Readers go through the core, never
//! through a `Store` directly.

mod file;
mod memory;

pub use file::{FileStore, FileStoreFactory};
pub use memory::{MemoryStore, MemoryStoreFactory};

use std::sync::Arc;

use async_trait::async_trait;

/// Store failure taxonomy.
///
/// `QuotaExceeded` is surfaced distinctly from `Io` so the cache can
/// degrade (serve the page without retaining it) instead of treating a
/// full store as fatal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Uniform async key/value persistence interface.
///
/// Values are opaque byte records; the cache serializes pages and the
/// settings record before they reach the store.
#[async_trait]
pub trait Store: Send + Sync {
    /// Read a record. `Ok(None)` means the key is absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or replace a record atomically.
    async fn write(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove a record. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every record held by this store.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Opens a [`Store`] for a cache name.
///
/// Caches with the same `name` must open the same underlying storage so
/// they share persisted pages and the settings record.
pub trait StoreFactory: Send + Sync {
    fn open(&self, name: &str) -> Result<Arc<dyn Store>, StoreError>;
}

/// Closed set of built-in store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMechanism {
    /// Private in-memory map; nothing survives the cache instance. To
    /// share memory storage between caches, inject one
    /// [`MemoryStoreFactory`] into both builders.
    #[default]
    Memory,
    /// One directory per cache name under the platform cache directory;
    /// survives process restarts.
    File,
}

impl StoreMechanism {
    pub(crate) fn factory(self) -> Arc<dyn StoreFactory> {
        match self {
            StoreMechanism::Memory => Arc::new(MemoryStoreFactory::new()),
            StoreMechanism::File => Arc::new(FileStoreFactory::new()),
        }
    }
}
