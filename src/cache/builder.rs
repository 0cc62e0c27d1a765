//! Builder for configuring cache instances.

use std::sync::Arc;

use super::core::{CacheCore, IdleCallback};
use super::{DEFAULT_CACHE_BYTES, DEFAULT_PAGE_SIZE, DataCache, Prefetch, prefetch};
use crate::error::{CacheError, Result};
use crate::source::{Credentials, HttpSource, HttpTransport, Record, ReqwestTransport, Source};
use crate::store::{StoreFactory, StoreMechanism};

/// Builder for [`DataCache`] instances.
///
/// A cache needs a name and exactly one source: either a resource URI
/// (served by the built-in HTTP source) or a caller-supplied
/// [`Source`] implementation.
pub struct DataCacheBuilder<R: Record> {
    name: String,
    uri: Option<String>,
    source: Option<Arc<dyn Source<R>>>,
    page_size: u64,
    cache_bytes: Option<u64>,
    prefetch: Prefetch,
    mechanism: StoreMechanism,
    store_factory: Option<Arc<dyn StoreFactory>>,
    transport: Option<Arc<dyn HttpTransport>>,
    credentials: Option<Credentials>,
    on_idle: Option<IdleCallback>,
}

impl<R: Record> DataCacheBuilder<R> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: None,
            source: None,
            page_size: DEFAULT_PAGE_SIZE,
            cache_bytes: Some(DEFAULT_CACHE_BYTES),
            prefetch: Prefetch::default(),
            mechanism: StoreMechanism::default(),
            store_factory: None,
            transport: None,
            credentials: None,
            on_idle: None,
        }
    }

    /// Cache a remote OData-style resource at this URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Cache a caller-supplied source. It provides its own identity and
    /// bypasses URI normalization.
    pub fn source(mut self, source: Arc<dyn Source<R>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Records per page. `build()` fails on zero.
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Soft byte budget for retained pages; oldest-fetched pages are
    /// evicted past it.
    pub fn cache_bytes(mut self, bytes: u64) -> Self {
        self.cache_bytes = Some(bytes);
        self
    }

    /// Retain pages without a byte budget.
    pub fn cache_unbounded(mut self) -> Self {
        self.cache_bytes = None;
        self
    }

    /// Background fetch-ahead policy. Default: [`Prefetch::All`].
    pub fn prefetch(mut self, prefetch: Prefetch) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Select a built-in store backend. Default:
    /// [`StoreMechanism::Memory`].
    pub fn mechanism(mut self, mechanism: StoreMechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    /// Inject a store factory, overriding `mechanism`. Two caches built
    /// against the same factory and name share storage.
    pub fn store_factory(mut self, factory: Arc<dyn StoreFactory>) -> Self {
        self.store_factory = Some(factory);
        self
    }

    /// Inject an HTTP transport for the built-in source.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Basic-auth credentials, forwarded verbatim to the transport.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Initial idle handler; see [`DataCache::set_on_idle`].
    pub fn on_idle(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_idle = Some(Arc::new(callback));
        self
    }

    /// Validate the configuration and create the cache.
    ///
    /// Must be called within a tokio runtime (the prefetch worker is
    /// spawned here).
    pub fn build(self) -> Result<DataCache<R>> {
        if self.name.trim().is_empty() {
            return Err(CacheError::Configuration("cache name is required".into()));
        }
        if self.page_size == 0 {
            return Err(CacheError::Configuration(
                "page_size must be positive".into(),
            ));
        }

        let source: Arc<dyn Source<R>> = match (self.source, self.uri) {
            (Some(_), Some(_)) => {
                return Err(CacheError::Configuration(
                    "provide either a source or a URI, not both".into(),
                ));
            }
            (Some(source), None) => source,
            (None, Some(uri)) => {
                let transport = self
                    .transport
                    .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
                Arc::new(HttpSource::new(&uri, transport, self.credentials)?)
            }
            (None, None) => {
                return Err(CacheError::Configuration(
                    "a source or a URI is required".into(),
                ));
            }
        };
        let source_id = source.identity();

        let factory = self
            .store_factory
            .unwrap_or_else(|| self.mechanism.factory());
        let store = factory.open(&self.name)?;

        let (core, hint_rx) = CacheCore::new(
            self.name,
            source,
            source_id,
            store,
            self.page_size,
            self.cache_bytes,
            self.prefetch,
            self.on_idle,
        );
        if self.prefetch != Prefetch::Disabled {
            prefetch::spawn(&core, hint_rx);
        }
        Ok(DataCache { core })
    }
}
