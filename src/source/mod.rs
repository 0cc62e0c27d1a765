//! Sources: where the cached collection actually lives.
//!
//! A [`Source`] is an ordered, index-addressable collection the cache
//! pulls pages from. The built-in [`HttpSource`] speaks OData-style
//! paging over an injectable [`HttpTransport`]; any caller-supplied
//! `Source` implementation works the same way and supplies its own
//! identity.

mod http;

pub use http::{
    Credentials, HttpResponse, HttpSource, HttpTransport, ReqwestTransport, normalize_uri,
};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Bound bundle for cached record types.
///
/// Records cross task boundaries, fan out to many waiters, and are
/// serialized into the store, hence the full set.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// An ordered remote collection read in index ranges.
#[async_trait]
pub trait Source<R: Record>: Send + Sync {
    /// Normalized identity of the collection. Two sources with the same
    /// identity are assumed to serve the same data and share persisted
    /// cache state.
    fn identity(&self) -> String;

    /// Total number of records in the collection.
    async fn count(&self) -> Result<u64>;

    /// Read up to `count` records starting at `index`.
    ///
    /// A result shorter than `count` means the collection ends at
    /// `index + result.len()`; reads at or past the end return an empty
    /// vec. The cache relies on this to learn the collection end without
    /// a separate count round trip.
    async fn read(&self, index: u64, count: u64) -> Result<Vec<R>>;
}
