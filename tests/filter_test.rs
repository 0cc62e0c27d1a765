//! Filter scanner tests — forward and backward predicate scans routed
//! through the cache.

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

fn cache(source: &Arc<IntSource>, page_size: u64) -> DataCache<u64> {
    DataCache::builder("filter")
        .source(Arc::clone(source) as Arc<dyn Source<u64>>)
        .page_size(page_size)
        .prefetch(Prefetch::Disabled)
        .build()
        .unwrap()
}

#[tokio::test]
async fn forward_collects_matches_with_indexes() {
    let source = IntSource::new(50);
    let cache = cache(&source, 10);

    let matches = cache
        .filter_forward(0, Some(3), |r| r % 7 == 0)
        .await
        .unwrap();
    let found: Vec<(u64, u64)> = matches.iter().map(|m| (m.index, m.record)).collect();
    assert_eq!(found, vec![(0, 0), (7, 7), (14, 14)]);
}

#[tokio::test]
async fn forward_unlimited_finds_a_lone_match_anywhere() {
    let source = IntSource::new(120);
    let cache = cache(&source, 10);

    let matches = cache.filter_forward(0, None, |r| *r == 113).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].index, 113);
    assert_eq!(matches[0].record, 113);
}

#[tokio::test]
async fn back_mirrors_forward_for_a_lone_match() {
    let source = IntSource::new(120);
    let cache = cache(&source, 10);

    let matches = cache.filter_back(119, None, |r| *r == 113).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].index, 113);
    assert_eq!(matches[0].record, 113);
}

#[tokio::test]
async fn back_visits_in_decreasing_order() {
    let source = IntSource::new(50);
    let cache = cache(&source, 10);

    let matches = cache
        .filter_back(49, Some(3), |r| r % 7 == 0)
        .await
        .unwrap();
    let found: Vec<u64> = matches.iter().map(|m| m.index).collect();
    assert_eq!(found, vec![49, 42, 35]);
}

#[tokio::test]
async fn scan_starts_at_the_given_index() {
    let source = IntSource::new(50);
    let cache = cache(&source, 10);

    let forward = cache
        .filter_forward(10, Some(1), |r| r % 7 == 0)
        .await
        .unwrap();
    assert_eq!(forward[0].index, 14);

    // Backward from 13 skips 14 and finds 7.
    let back = cache.filter_back(13, Some(1), |r| r % 7 == 0).await.unwrap();
    assert_eq!(back[0].index, 7);
}

#[tokio::test]
async fn zero_limit_issues_no_reads() {
    let source = IntSource::new(50);
    let cache = cache(&source, 10);

    assert!(
        cache
            .filter_forward(0, Some(0), |_| true)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        cache
            .filter_back(49, Some(0), |_| true)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(source.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn index_past_end_matches_nothing() {
    let source = IntSource::new(25);
    let cache = cache(&source, 10);

    assert!(
        cache
            .filter_forward(30, None, |_| true)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        cache
            .filter_back(30, None, |_| true)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn full_scan_fetches_each_page_once() {
    let source = IntSource::new(100);
    let cache = cache(&source, 10);

    let matches = cache.filter_forward(0, None, |r| r % 25 == 0).await.unwrap();
    assert_eq!(matches.len(), 4);
    // Ten data pages plus the empty probe at 100 that proves the end.
    assert_eq!(source.reads.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn empty_collection_matches_nothing() {
    let source = IntSource::new(0);
    let cache = cache(&source, 10);

    assert!(
        cache
            .filter_forward(0, None, |_| true)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        cache
            .filter_back(0, None, |_| true)
            .await
            .unwrap()
            .is_empty()
    );
}
