//! Page cache core.
//!
//! Owns the mapping from logical index ranges to page-aligned fetches,
//! the pending-fetch table (request coalescing), FIFO byte-budget
//! eviction, lazy store initialization with version checking, and idle
//! detection. Everything else in the crate reads through this module.
//!
//! # Request coalescing
//!
//! At most one fetch is in flight per page. Every logical request for an
//! uncached page attaches a waiter to the pending fetch's [`Deferred`];
//! success and failure fan out to all of them. When the last waiter is
//! dropped the fetch task is aborted and the cell canceled.
//!
//! # Epochs
//!
//! `clear()` bumps a generation counter. Fetch tasks re-check it before
//! touching cache state, so a fetch that completes after a clear cannot
//! resurrect pre-clear data.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::{OnceCell, watch};
use tokio::task::AbortHandle;
use tracing::{debug, trace, warn};

use super::{CacheStats, Prefetch};
use crate::deferred::Deferred;
use crate::error::{CacheError, Result};
use crate::source::{Record, Source};
use crate::store::Store;
use crate::telemetry;

/// Reserved store key for the settings record.
pub(crate) const SETTINGS_KEY: &str = "__muninn";

/// Bumped whenever the serialized page or settings layout changes. A
/// stored record with any other version reinitializes the store.
pub(crate) const CACHE_FORMAT_VERSION: u32 = 1;

pub(crate) fn page_key(page_start: u64) -> String {
    format!("p{page_start}")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct CacheSettings {
    version: u32,
    source_id: String,
    page_size: u64,
}

/// One page-aligned slice of the collection as persisted in the store.
///
/// A page with fewer than `page_size` records marks the collection end
/// at `index + records.len()`; short and empty pages are stored like any
/// other so the end survives restarts.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PageData<R> {
    pub index: u64,
    pub records: Vec<R>,
    pub fetched_at_ms: u64,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Idle notification callback.
pub type IdleCallback = Arc<dyn Fn() + Send + Sync>;

struct PendingFetch<R> {
    deferred: Deferred<Arc<PageData<R>>>,
    waiters: usize,
    abort: AbortHandle,
}

struct CoreState<R> {
    pending: HashMap<u64, PendingFetch<R>>,
    pending_count: Option<Deferred<u64>>,
    /// FIFO eviction order over pages currently charged to the budget.
    tracked: VecDeque<u64>,
    page_bytes: HashMap<u64, u64>,
    tracked_bytes: u64,
    /// Exact collection length, once a short page or a count proves it.
    known_end: Option<u64>,
    epoch: u64,
    /// Foreground `read_range` calls currently in progress. Idle never
    /// fires while one is; the gap between its last fetch settling and
    /// its prefetch hint going out is not an idle transition.
    active_reads: usize,
    worker_busy: bool,
    idle_armed: bool,
}

#[derive(Default)]
struct StatCounters {
    net_reads: AtomicU64,
    prefetches: AtomicU64,
    cache_reads: AtomicU64,
    counts: AtomicU64,
}

impl StatCounters {
    fn snapshot(&self) -> CacheStats {
        CacheStats {
            net_reads: self.net_reads.load(Ordering::Relaxed),
            prefetches: self.prefetches.load(Ordering::Relaxed),
            cache_reads: self.cache_reads.load(Ordering::Relaxed),
            counts: self.counts.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.net_reads.store(0, Ordering::Relaxed);
        self.prefetches.store(0, Ordering::Relaxed);
        self.cache_reads.store(0, Ordering::Relaxed);
        self.counts.store(0, Ordering::Relaxed);
    }
}

pub(crate) struct CacheCore<R: Record> {
    name: String,
    source: Arc<dyn Source<R>>,
    source_id: String,
    store: Arc<dyn Store>,
    page_size: u64,
    cache_bytes: Option<u64>,
    prefetch: Prefetch,
    state: Mutex<CoreState<R>>,
    stats: StatCounters,
    init: OnceCell<std::result::Result<(), CacheError>>,
    on_idle: Mutex<Option<IdleCallback>>,
    idle_edges: watch::Sender<u64>,
    hint_tx: watch::Sender<Option<u64>>,
    clear_lock: tokio::sync::Mutex<()>,
    self_ref: Weak<CacheCore<R>>,
}

/// Detaches a waiter from a pending fetch if the waiter is dropped
/// before the fetch settles. The fetch is aborted when its last waiter
/// goes away.
struct AttachGuard<R: Record> {
    core: Weak<CacheCore<R>>,
    page: u64,
    epoch: u64,
    armed: bool,
}

impl<R: Record> AttachGuard<R> {
    fn complete(mut self) {
        self.armed = false;
    }
}

impl<R: Record> Drop for AttachGuard<R> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(core) = self.core.upgrade() {
            core.detach(self.page, self.epoch);
        }
    }
}

/// Balances the `active_reads` counter even when a `read_range` future
/// is dropped mid-flight.
struct ActiveRead<R: Record> {
    core: Weak<CacheCore<R>>,
}

impl<R: Record> Drop for ActiveRead<R> {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.state().active_reads -= 1;
            core.maybe_fire_idle();
        }
    }
}

impl<R: Record> CacheCore<R> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        source: Arc<dyn Source<R>>,
        source_id: String,
        store: Arc<dyn Store>,
        page_size: u64,
        cache_bytes: Option<u64>,
        prefetch: Prefetch,
        on_idle: Option<IdleCallback>,
    ) -> (Arc<Self>, watch::Receiver<Option<u64>>) {
        let (hint_tx, hint_rx) = watch::channel(None);
        let (idle_edges, _) = watch::channel(0u64);
        let core = Arc::new_cyclic(|weak| CacheCore {
            name,
            source,
            source_id,
            store,
            page_size,
            cache_bytes,
            prefetch,
            state: Mutex::new(CoreState {
                pending: HashMap::new(),
                pending_count: None,
                tracked: VecDeque::new(),
                page_bytes: HashMap::new(),
                tracked_bytes: 0,
                known_end: None,
                epoch: 0,
                active_reads: 0,
                worker_busy: false,
                idle_armed: false,
            }),
            stats: StatCounters::default(),
            init: OnceCell::new(),
            on_idle: Mutex::new(on_idle),
            idle_edges,
            hint_tx,
            clear_lock: tokio::sync::Mutex::new(()),
            self_ref: weak.clone(),
        });
        (core, hint_rx)
    }

    fn state(&self) -> MutexGuard<'_, CoreState<R>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn source_id(&self) -> &str {
        &self.source_id
    }

    pub(crate) fn page_size(&self) -> u64 {
        self.page_size
    }

    pub(crate) fn prefetch(&self) -> Prefetch {
        self.prefetch
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub(crate) fn current_epoch(&self) -> u64 {
        self.state().epoch
    }

    pub(crate) fn known_end(&self) -> Option<u64> {
        self.state().known_end
    }

    pub(crate) fn set_on_idle(&self, callback: Option<IdleCallback>) {
        *self.on_idle.lock().unwrap_or_else(|e| e.into_inner()) = callback;
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Lazily initialize against the store. A failure here permanently
    /// invalidates the cache; every later call short-circuits to
    /// `Err(Invalidated)` without touching store or source.
    async fn ensure_init(&self) -> Result<()> {
        let outcome = self
            .init
            .get_or_init(|| async {
                let outcome = self.initialize().await;
                if let Err(e) = &outcome {
                    warn!(name = %self.name, error = %e, "initialization failed; cache invalidated");
                }
                outcome
            })
            .await;
        match outcome {
            Ok(()) => Ok(()),
            Err(_) => Err(CacheError::Invalidated),
        }
    }

    async fn initialize(&self) -> Result<()> {
        match self.store.read(SETTINGS_KEY).await? {
            Some(bytes) => {
                match serde_json::from_slice::<CacheSettings>(&bytes) {
                    Ok(settings)
                        if settings.version == CACHE_FORMAT_VERSION
                            && settings.source_id == self.source_id
                            && settings.page_size == self.page_size =>
                    {
                        debug!(name = %self.name, "attached to existing store");
                        return Ok(());
                    }
                    Ok(settings) => {
                        debug!(
                            name = %self.name,
                            stored_version = settings.version,
                            "settings record does not match, reinitializing store"
                        );
                    }
                    Err(e) => {
                        debug!(name = %self.name, error = %e, "corrupt settings record, reinitializing store");
                    }
                }
                self.store.clear().await?;
                self.write_settings().await
            }
            None => {
                debug!(name = %self.name, "initializing fresh store");
                self.write_settings().await
            }
        }
    }

    async fn write_settings(&self) -> Result<()> {
        let settings = CacheSettings {
            version: CACHE_FORMAT_VERSION,
            source_id: self.source_id.clone(),
            page_size: self.page_size,
        };
        let bytes = serde_json::to_vec(&settings)
            .map_err(|e| CacheError::Payload(format!("settings serialization failed: {e}")))?;
        self.store.write(SETTINGS_KEY, bytes).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Public contract
    // ------------------------------------------------------------------

    pub(crate) async fn read_range(&self, index: u64, count: u64) -> Result<Vec<R>> {
        self.ensure_init().await?;
        self.state().active_reads += 1;
        let _active = ActiveRead {
            core: self.self_ref.clone(),
        };
        self.read_range_inner(index, count).await
    }

    async fn read_range_inner(&self, index: u64, count: u64) -> Result<Vec<R>> {
        let Some(end) = index.checked_add(count) else {
            return Err(CacheError::InvalidInput(format!(
                "index {index} + count {count} overflows"
            )));
        };
        if count == 0 {
            return Ok(Vec::new());
        }
        if let Some(known) = self.known_end() {
            if index >= known {
                return Ok(Vec::new());
            }
        }

        let mut out = Vec::new();
        let mut page_start = (index / self.page_size) * self.page_size;
        while page_start < end {
            if let Some(known) = self.known_end() {
                if page_start >= known {
                    break;
                }
            }
            let page = self.get_page(page_start, true).await?;
            let page_end = page.index + page.records.len() as u64;
            let from = index.max(page.index);
            let to = end.min(page_end);
            if from < to {
                let lo = (from - page.index) as usize;
                let hi = (to - page.index) as usize;
                out.extend(page.records[lo..hi].iter().cloned());
            }
            if (page.records.len() as u64) < self.page_size {
                break;
            }
            page_start += self.page_size;
        }

        self.hint_prefetch(end);
        Ok(out)
    }

    /// Collection count, forwarded to the source with the same in-flight
    /// dedup as page fetches: concurrent callers share one request.
    pub(crate) async fn count(&self) -> Result<u64> {
        self.ensure_init().await?;
        let (deferred, issue) = {
            let mut st = self.state();
            match &st.pending_count {
                Some(d) => (d.clone(), false),
                None => {
                    let d = Deferred::new();
                    st.pending_count = Some(d.clone());
                    st.idle_armed = true;
                    (d, true)
                }
            }
        };
        if issue {
            self.stats.counts.fetch_add(1, Ordering::Relaxed);
            let epoch = self.current_epoch();
            if let Some(core) = self.self_ref.upgrade() {
                let cell = deferred.clone();
                tokio::spawn(async move {
                    let outcome = core.source.count().await;
                    {
                        let mut st = core.state();
                        if st.epoch == epoch {
                            st.pending_count = None;
                            if let Ok(n) = &outcome {
                                st.known_end = Some(*n);
                            }
                        }
                    }
                    match outcome {
                        Ok(n) => cell.resolve(n),
                        Err(e) => cell.reject(e),
                    };
                    core.maybe_fire_idle();
                });
            } else {
                deferred.cancel();
            }
        }
        deferred.wait().await
    }

    /// Drop everything: cancel in-flight fetches, clear the store,
    /// rewrite the settings record, reset statistics. Concurrent calls
    /// serialize internally and all resolve successfully.
    pub(crate) async fn clear(&self) -> Result<()> {
        self.ensure_init().await?;
        let _serial = self.clear_lock.lock().await;
        debug!(name = %self.name, "clearing cache");

        let (pending, pending_count) = {
            let mut st = self.state();
            st.epoch += 1;
            st.known_end = None;
            st.tracked.clear();
            st.page_bytes.clear();
            st.tracked_bytes = 0;
            st.idle_armed = false;
            (std::mem::take(&mut st.pending), st.pending_count.take())
        };
        for fetch in pending.into_values() {
            fetch.abort.abort();
            fetch.deferred.cancel();
        }
        if let Some(cell) = pending_count {
            cell.cancel();
        }
        // Park the prefetch worker; its epoch check abandons any window
        // already in progress.
        let _ = self.hint_tx.send(None);

        self.store.clear().await?;
        self.write_settings().await?;
        self.stats.reset();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Page acquisition
    // ------------------------------------------------------------------

    /// Produce one page, whatever it takes: attach to an in-flight
    /// fetch, serve from the store, or issue a source fetch. `foreground`
    /// only decides which statistic a newly issued fetch lands in.
    pub(crate) async fn get_page(&self, page_start: u64, foreground: bool) -> Result<Arc<PageData<R>>> {
        if let Some((deferred, guard)) = self.try_attach(page_start) {
            let outcome = deferred.wait().await;
            guard.complete();
            return outcome;
        }

        match self.store.read(&page_key(page_start)).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<PageData<R>>(&bytes) {
                Ok(page) => {
                    self.stats.cache_reads.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                    trace!(page = page_start, "page served from store");
                    let page = Arc::new(page);
                    let victims = {
                        let mut st = self.state();
                        self.learn_end_locked(&mut st, &page);
                        self.track_locked(&mut st, page_start, bytes.len() as u64)
                    };
                    self.drop_victims(victims).await;
                    return Ok(page);
                }
                Err(e) => {
                    warn!(page = page_start, error = %e, "corrupt page record, refetching");
                    self.untrack(page_start);
                    if let Err(e) = self.store.remove(&page_key(page_start)).await {
                        warn!(page = page_start, error = %e, "failed to drop corrupt page");
                    }
                }
            },
            Ok(None) => self.untrack(page_start),
            Err(e) => {
                warn!(page = page_start, error = %e, "store read failed, falling back to source");
                self.untrack(page_start);
            }
        }

        let (deferred, guard, issued) = self.acquire_fetch(page_start);
        if issued {
            if foreground {
                self.stats.net_reads.fetch_add(1, Ordering::Relaxed);
            } else {
                self.stats.prefetches.fetch_add(1, Ordering::Relaxed);
            }
            let kind = if foreground { "foreground" } else { "prefetch" };
            metrics::counter!(telemetry::FETCHES_TOTAL, "kind" => kind).increment(1);
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
            trace!(page = page_start, kind, "issuing source fetch");
        }
        let outcome = deferred.wait().await;
        guard.complete();
        outcome
    }

    fn attach_guard(&self, page: u64, epoch: u64, armed: bool) -> AttachGuard<R> {
        AttachGuard {
            core: self.self_ref.clone(),
            page,
            epoch,
            armed,
        }
    }

    fn try_attach(&self, page_start: u64) -> Option<(Deferred<Arc<PageData<R>>>, AttachGuard<R>)> {
        let mut st = self.state();
        let pending = st.pending.get_mut(&page_start)?;
        pending.waiters += 1;
        let deferred = pending.deferred.clone();
        let epoch = st.epoch;
        drop(st);
        Some((deferred, self.attach_guard(page_start, epoch, true)))
    }

    /// Issue a fetch for the page, unless another task issued one while
    /// we were probing the store, in which case attach to that instead.
    fn acquire_fetch(&self, page_start: u64) -> (Deferred<Arc<PageData<R>>>, AttachGuard<R>, bool) {
        let mut st = self.state();
        let epoch = st.epoch;
        if let Some(pending) = st.pending.get_mut(&page_start) {
            pending.waiters += 1;
            let deferred = pending.deferred.clone();
            drop(st);
            return (deferred, self.attach_guard(page_start, epoch, true), false);
        }

        let deferred: Deferred<Arc<PageData<R>>> = Deferred::new();
        let Some(core) = self.self_ref.upgrade() else {
            deferred.cancel();
            drop(st);
            return (deferred, self.attach_guard(page_start, epoch, false), false);
        };
        st.idle_armed = true;
        let task = {
            let cell = deferred.clone();
            tokio::spawn(async move { core.run_fetch(page_start, epoch, cell).await })
        };
        st.pending.insert(
            page_start,
            PendingFetch {
                deferred: deferred.clone(),
                waiters: 1,
                abort: task.abort_handle(),
            },
        );
        drop(st);
        (deferred, self.attach_guard(page_start, epoch, true), true)
    }

    async fn run_fetch(self: Arc<Self>, page_start: u64, epoch: u64, cell: Deferred<Arc<PageData<R>>>) {
        match self.fetch_page(page_start).await {
            Ok((page, retained_bytes)) => {
                let (victims, stale) = {
                    let mut st = self.state();
                    if st.epoch == epoch {
                        st.pending.remove(&page_start);
                        self.learn_end_locked(&mut st, &page);
                        let victims = match retained_bytes {
                            Some(bytes) => self.track_locked(&mut st, page_start, bytes),
                            None => Vec::new(),
                        };
                        (victims, false)
                    } else {
                        (Vec::new(), retained_bytes.is_some())
                    }
                };
                if stale {
                    // Written after a clear() wiped the store; drop it.
                    if let Err(e) = self.store.remove(&page_key(page_start)).await {
                        warn!(page = page_start, error = %e, "failed to drop stale page");
                    }
                }
                self.drop_victims(victims).await;
                cell.resolve(page);
            }
            Err(e) => {
                {
                    let mut st = self.state();
                    if st.epoch == epoch {
                        st.pending.remove(&page_start);
                    }
                }
                cell.reject(e);
            }
        }
        self.maybe_fire_idle();
    }

    /// Read one page from the source and try to retain it. A store
    /// failure degrades: the page is still served, just not retained.
    async fn fetch_page(&self, page_start: u64) -> Result<(Arc<PageData<R>>, Option<u64>)> {
        let records = self.source.read(page_start, self.page_size).await?;
        let page = Arc::new(PageData {
            index: page_start,
            records,
            fetched_at_ms: now_ms(),
        });
        let retained = match serde_json::to_vec(&*page) {
            Ok(bytes) => {
                let len = bytes.len() as u64;
                match self.store.write(&page_key(page_start), bytes).await {
                    Ok(()) => Some(len),
                    Err(e) => {
                        warn!(page = page_start, error = %e, "page write failed, serving without retention");
                        metrics::counter!(telemetry::STORE_FAILURES_TOTAL, "operation" => "write")
                            .increment(1);
                        None
                    }
                }
            }
            Err(e) => {
                warn!(page = page_start, error = %e, "page serialization failed, serving without retention");
                None
            }
        };
        Ok((page, retained))
    }

    fn detach(&self, page: u64, epoch: u64) {
        let abandoned = {
            let mut st = self.state();
            if st.epoch != epoch {
                None
            } else if let Some(pending) = st.pending.get_mut(&page) {
                pending.waiters -= 1;
                if pending.waiters == 0 {
                    st.pending.remove(&page)
                } else {
                    None
                }
            } else {
                None
            }
        };
        if let Some(fetch) = abandoned {
            trace!(page, "last waiter gone, aborting fetch");
            fetch.abort.abort();
            fetch.deferred.cancel();
            self.maybe_fire_idle();
        }
    }

    // ------------------------------------------------------------------
    // Residency tracking and eviction
    // ------------------------------------------------------------------

    fn learn_end_locked(&self, st: &mut CoreState<R>, page: &PageData<R>) {
        if (page.records.len() as u64) < self.page_size {
            st.known_end = Some(page.index + page.records.len() as u64);
        }
    }

    /// Charge a stored page to the byte budget. Returns pages to evict,
    /// oldest first.
    fn track_locked(&self, st: &mut CoreState<R>, page_start: u64, bytes: u64) -> Vec<u64> {
        if st.page_bytes.contains_key(&page_start) {
            return Vec::new();
        }
        st.page_bytes.insert(page_start, bytes);
        st.tracked.push_back(page_start);
        st.tracked_bytes += bytes;

        let Some(budget) = self.cache_bytes else {
            return Vec::new();
        };
        let mut victims = Vec::new();
        let mut scan = st.tracked.len();
        while st.tracked_bytes > budget && scan > 0 {
            scan -= 1;
            let Some(victim) = st.tracked.pop_front() else {
                break;
            };
            // A page with an in-flight fetch is never an eviction
            // candidate.
            if st.pending.contains_key(&victim) {
                st.tracked.push_back(victim);
                continue;
            }
            if let Some(b) = st.page_bytes.remove(&victim) {
                st.tracked_bytes -= b;
            }
            victims.push(victim);
        }
        victims
    }

    fn untrack(&self, page_start: u64) {
        let mut st = self.state();
        if let Some(bytes) = st.page_bytes.remove(&page_start) {
            st.tracked_bytes -= bytes;
            st.tracked.retain(|p| *p != page_start);
        }
    }

    async fn drop_victims(&self, victims: Vec<u64>) {
        for victim in victims {
            debug!(page = victim, "evicting page");
            metrics::counter!(telemetry::EVICTIONS_TOTAL).increment(1);
            if let Err(e) = self.store.remove(&page_key(victim)).await {
                warn!(page = victim, error = %e, "failed to remove evicted page");
                metrics::counter!(telemetry::STORE_FAILURES_TOTAL, "operation" => "remove")
                    .increment(1);
            }
        }
    }

    // ------------------------------------------------------------------
    // Idle detection and prefetch hand-off
    // ------------------------------------------------------------------

    fn hint_prefetch(&self, window_end: u64) {
        if self.prefetch == Prefetch::Disabled {
            return;
        }
        {
            let mut st = self.state();
            st.worker_busy = true;
            st.idle_armed = true;
        }
        let _ = self.hint_tx.send(Some(window_end));
    }

    /// Called by the prefetch worker when it has drained every hint.
    pub(crate) fn worker_parked(&self) {
        self.state().worker_busy = false;
        self.maybe_fire_idle();
    }

    /// Fire `on_idle` if a fetch transition just drained: armed by
    /// activity, and nothing pending anywhere. Fires at most once per
    /// transition; new fetch activity re-arms.
    pub(crate) fn maybe_fire_idle(&self) {
        let fire = {
            let mut st = self.state();
            if st.idle_armed
                && st.pending.is_empty()
                && st.pending_count.is_none()
                && st.active_reads == 0
                && !st.worker_busy
            {
                st.idle_armed = false;
                true
            } else {
                false
            }
        };
        if fire {
            debug!(name = %self.name, "cache idle");
            let callback = self
                .on_idle
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            if let Some(callback) = callback {
                callback();
            }
            self.idle_edges.send_modify(|edges| *edges += 1);
        }
    }

    fn is_idle(&self) -> bool {
        let st = self.state();
        st.pending.is_empty() && st.pending_count.is_none() && !st.worker_busy && !st.idle_armed
    }

    /// Resolve when the cache is idle: immediately if nothing is pending
    /// or armed, otherwise on the next idle edge.
    pub(crate) async fn wait_idle(&self) {
        let mut edges = self.idle_edges.subscribe();
        loop {
            if self.is_idle() {
                return;
            }
            if edges.changed().await.is_err() {
                return;
            }
        }
    }
}
