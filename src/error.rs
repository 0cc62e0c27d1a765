//! Muninn error types

use crate::store::StoreError;

/// Muninn error types.
///
/// Errors are `Clone` because a single fetch settlement fans out to every
/// waiter attached to it (see [`Deferred`](crate::deferred::Deferred)).
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    // Transport/source errors
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
        url: Option<String>,
    },

    /// An injected [`Source`](crate::source::Source) implementation failed.
    #[error("source error: {0}")]
    Source(String),

    /// The remote payload could not be decoded (missing `value` array,
    /// malformed record, non-numeric `$count` body, ...).
    #[error("malformed payload: {0}")]
    Payload(String),

    // Persistence errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    // Caller errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The operation was canceled before it settled.
    ///
    /// Not a system failure: `clear()` and dropped read futures cancel
    /// in-flight fetches cooperatively. Distinguish with [`is_canceled`].
    ///
    /// [`is_canceled`]: CacheError::is_canceled
    #[error("operation canceled")]
    Canceled,

    /// The store failed while the cache was initializing its settings
    /// record. The cache is permanently unusable; every subsequent call
    /// returns this error without touching store or source.
    #[error("cache invalidated: storage failed during initialization")]
    Invalidated,
}

impl CacheError {
    /// Whether this error is a cooperative cancellation rather than a
    /// transport, store, or caller failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, CacheError::Canceled)
    }
}

/// Result type alias for muninn operations
pub type Result<T> = std::result::Result<T, CacheError>;
