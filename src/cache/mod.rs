//! The data cache: public surface, builder, prefetch, filter, stream.

mod builder;
mod core;
mod filter;
mod prefetch;
mod stream;

pub use builder::DataCacheBuilder;
pub use self::core::IdleCallback;
pub use stream::{RecordStream, STREAM_BUFFER};

use std::sync::Arc;

use self::core::CacheCore;
use crate::error::Result;
use crate::source::Record;

/// Records per page when the builder does not say otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Byte budget for retained pages when the builder does not say
/// otherwise. `cache_unbounded()` removes the budget entirely.
pub const DEFAULT_CACHE_BYTES: u64 = 1024 * 1024;

/// Background fetch-ahead policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Prefetch {
    /// Never fetch ahead.
    Disabled,
    /// Fetch ahead until the end of the collection.
    #[default]
    All,
    /// Fetch ahead up to this many records past the last foreground
    /// window.
    Lookahead(u64),
}

/// Point-in-time statistics snapshot.
///
/// Exactly one of `net_reads`/`prefetches` is incremented per physical
/// source fetch, decided when the fetch is issued. A foreground request
/// absorbed by an in-flight prefetch increments neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Source page fetches issued by foreground reads.
    pub net_reads: u64,
    /// Source page fetches issued by the prefetch scheduler.
    pub prefetches: u64,
    /// Pages served from the local store.
    pub cache_reads: u64,
    /// Source count requests issued.
    pub counts: u64,
}

/// A record paired with its logical index, as returned by the filter
/// scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed<R> {
    pub index: u64,
    pub record: R,
}

/// Client-side cache over a remote paged collection.
///
/// Turns an arbitrarily large, network-backed, ordered collection into a
/// locally addressable, randomly-readable sequence while minimizing
/// round trips. Cheap to clone; clones share all state.
///
/// Created through [`DataCache::builder`]. One cache exists per
/// `(name, source)` pair: the `name` binds to a persisted settings
/// record, so caches with the same name share state across process
/// restarts when backed by a persistent store.
pub struct DataCache<R: Record> {
    pub(crate) core: Arc<CacheCore<R>>,
}

impl<R: Record> Clone for DataCache<R> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<R: Record> DataCache<R> {
    /// Start configuring a cache. `build()` must be called within a
    /// tokio runtime.
    pub fn builder(name: impl Into<String>) -> DataCacheBuilder<R> {
        DataCacheBuilder::new(name)
    }

    /// Read the records in `[index, index + count)`.
    ///
    /// `count == 0` resolves to an empty vec. An `index` at or past the
    /// collection end yields an empty vec; a `count` extending past the
    /// end is clamped silently. `index + count` overflowing `u64` is
    /// `CacheError::InvalidInput`, returned before any I/O.
    pub async fn read_range(&self, index: u64, count: u64) -> Result<Vec<R>> {
        self.core.read_range(index, count).await
    }

    /// Total number of records in the collection, from the source.
    pub async fn count(&self) -> Result<u64> {
        self.core.count().await
    }

    /// Cancel in-flight work, discard all cached pages, and reset
    /// statistics. Resolves once the store confirms.
    pub async fn clear(&self) -> Result<()> {
        self.core.clear().await
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    /// The caller-chosen cache name.
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Normalized source identity this cache is bound to.
    pub fn source_id(&self) -> &str {
        self.core.source_id()
    }

    /// Replace the idle handler. The callback fires exactly once per
    /// idle transition: when every foreground and prefetch fetch of that
    /// transition has settled. New fetch activity re-arms it.
    pub fn set_on_idle(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.core.set_on_idle(Some(Arc::new(callback)));
    }

    /// Remove the idle handler.
    pub fn clear_on_idle(&self) {
        self.core.set_on_idle(None);
    }

    /// Wait until the cache is idle: no fetch pending or scheduled.
    pub async fn wait_idle(&self) {
        self.core.wait_idle().await
    }
}

impl<R: Record> std::fmt::Debug for DataCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCache")
            .field("name", &self.core.name())
            .field("source_id", &self.core.source_id())
            .field("page_size", &self.core.page_size())
            .finish_non_exhaustive()
    }
}
