//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `kind` — what initiated a fetch: "foreground" or "prefetch"
//! - `operation` — store operation that failed: "read", "write", "remove",
//!   "clear"

/// Total source fetches issued (one per physical page or count request).
///
/// Labels: `kind` ("foreground" | "prefetch").
pub const FETCHES_TOTAL: &str = "muninn_fetches_total";

/// Total pages served from the local store.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total page lookups that required a source fetch.
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total pages evicted under the byte budget.
pub const EVICTIONS_TOTAL: &str = "muninn_evictions_total";

/// Total store operations that failed on the degraded path (the cache
/// kept serving; the page simply was not retained).
///
/// Labels: `operation`.
pub const STORE_FAILURES_TOTAL: &str = "muninn_store_failures_total";
