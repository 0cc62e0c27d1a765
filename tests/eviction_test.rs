//! Byte-budget eviction tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use muninn::{DataCache, Prefetch, Result, Source};

struct IntSource {
    total: u64,
    reads: AtomicU64,
}

impl IntSource {
    fn new(total: u64) -> Arc<Self> {
        Arc::new(Self {
            total,
            reads: AtomicU64::new(0),
        })
    }

    fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source<u64> for IntSource {
    fn identity(&self) -> String {
        "ints".into()
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.total)
    }

    async fn read(&self, index: u64, count: u64) -> Result<Vec<u64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let end = (index + count).min(self.total);
        Ok((index.min(end)..end).collect())
    }
}

// Pages of ten u64s serialize to 21 bytes (single-digit records) and
// 31 bytes (two-digit), so a 40-byte budget holds exactly one page.

#[tokio::test]
async fn oldest_page_is_evicted_when_the_budget_overflows() {
    let source = IntSource::new(100);
    let cache = DataCache::builder("evict")
        .source(Arc::clone(&source) as Arc<dyn Source<u64>>)
        .page_size(10)
        .cache_bytes(40)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    cache.read_range(0, 10).await.unwrap();
    cache.read_range(10, 10).await.unwrap();
    assert_eq!(source.reads(), 2);

    // Page 0 was evicted to make room for page 1, so it costs a fetch.
    let records = cache.read_range(0, 10).await.unwrap();
    assert_eq!(records, (0..10).collect::<Vec<_>>());
    assert_eq!(source.reads(), 3);

    // And that fetch in turn evicted page 1.
    cache.read_range(10, 10).await.unwrap();
    assert_eq!(source.reads(), 4);
}

#[tokio::test]
async fn pages_within_budget_are_retained() {
    let source = IntSource::new(100);
    let cache = DataCache::builder("evict")
        .source(Arc::clone(&source) as Arc<dyn Source<u64>>)
        .page_size(10)
        .cache_bytes(4096)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    cache.read_range(0, 20).await.unwrap();
    cache.read_range(0, 20).await.unwrap();
    assert_eq!(source.reads(), 2);
    assert_eq!(cache.stats().cache_reads, 2);
}

#[tokio::test]
async fn unbounded_cache_never_evicts() {
    let source = IntSource::new(100);
    let cache = DataCache::builder("evict")
        .source(Arc::clone(&source) as Arc<dyn Source<u64>>)
        .page_size(10)
        .cache_unbounded()
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap();

    for start in (0..100).step_by(10) {
        cache.read_range(start, 10).await.unwrap();
    }
    assert_eq!(source.reads(), 10);

    for start in (0..100).step_by(10) {
        cache.read_range(start, 10).await.unwrap();
    }
    assert_eq!(source.reads(), 10);
}
