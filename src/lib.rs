//! Muninn - client-side cache for remote paged collections
//!
//! This crate turns an arbitrarily large, network-backed, ordered
//! collection (an OData-style resource) into a locally addressable,
//! randomly-readable sequence while minimizing round trips. A
//! page-oriented cache sits between callers and (a) the remote
//! [`Source`] and (b) a pluggable local [`Store`], with request
//! coalescing, background prefetch with idle detection, bounded-size
//! eviction, and persistent-store version migration.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{DataCache, Prefetch};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let cache: DataCache<serde_json::Value> = DataCache::builder("people")
//!         .uri("http://services.example.org/odata/People")
//!         .page_size(50)
//!         .prefetch(Prefetch::All)
//!         .build()?;
//!
//!     // First read goes to the source; everything after is local.
//!     let window = cache.read_range(0, 10).await?;
//!     println!("{} records, {:?}", window.len(), cache.stats());
//!     Ok(())
//! }
//! ```
//!
//! # Filter scan example
//!
//! ```rust,no_run
//! # use muninn::DataCache;
//! # async fn scan(cache: DataCache<serde_json::Value>) -> muninn::Result<()> {
//! // First two matching records at or after index 100, scanning
//! // forward through the cache, never around it.
//! let hits = cache
//!     .filter_forward(100, Some(2), |record| record["Age"] == 42)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod deferred;
pub mod error;
pub mod source;
pub mod store;
pub mod telemetry;

// Re-export main types at crate root
pub use cache::{
    CacheStats, DEFAULT_CACHE_BYTES, DEFAULT_PAGE_SIZE, DataCache, DataCacheBuilder, Indexed,
    Prefetch, RecordStream, STREAM_BUFFER,
};
pub use deferred::{Deferred, Settled};
pub use error::{CacheError, Result};
pub use source::{
    Credentials, HttpResponse, HttpSource, HttpTransport, Record, ReqwestTransport, Source,
};
pub use store::{
    FileStore, FileStoreFactory, MemoryStore, MemoryStoreFactory, Store, StoreError, StoreFactory,
    StoreMechanism,
};
