//! Full traversal of the collection as a push-based stream.
//!
//! A producer task walks the collection through the cache core and
//! feeds a bounded `tokio::sync::mpsc::channel`, so a slow consumer
//! exerts backpressure instead of letting the producer race ahead
//! fetching pages for nobody. Dropping the stream aborts the producer
//! and thereby any further page fetching.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use super::DataCache;
use crate::error::Result;
use crate::source::Record;

/// Number of records buffered between producer and consumer.
pub const STREAM_BUFFER: usize = 64;

struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pin_project_lite::pin_project! {
    /// Finite, non-restartable traversal of the whole collection.
    ///
    /// Yields each record once in increasing index order, then ends; or
    /// yields the first unrecoverable fetch error and ends. Every call
    /// to [`DataCache::to_stream`] starts an independent traversal from
    /// index 0.
    pub struct RecordStream<R> {
        #[pin]
        inner: ReceiverStream<Result<R>>,
        guard: AbortOnDrop,
    }
}

impl<R> Stream for RecordStream<R> {
    type Item = Result<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

impl<R: Record> DataCache<R> {
    /// Traverse the entire collection as a stream of records.
    pub fn to_stream(&self) -> RecordStream<R> {
        let (tx, rx) = tokio::sync::mpsc::channel(STREAM_BUFFER);
        let cache = self.clone();
        let producer = tokio::spawn(async move {
            let page_size = cache.core.page_size();
            let mut pos = 0u64;
            loop {
                match cache.read_range(pos, page_size).await {
                    Ok(records) => {
                        let produced = records.len() as u64;
                        for record in records {
                            if tx.send(Ok(record)).await.is_err() {
                                return; // consumer dropped the stream
                            }
                        }
                        if produced < page_size {
                            return; // end of collection
                        }
                        pos += produced;
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                }
            }
        });
        RecordStream {
            inner: ReceiverStream::new(rx),
            guard: AbortOnDrop(producer),
        }
    }
}
