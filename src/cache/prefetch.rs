//! Background prefetch scheduler.
//!
//! One long-lived worker task per cache, fed by a `watch` channel of
//! hints. Each successful foreground read publishes the end of its
//! window; the worker walks pages sequentially from the freshest hint,
//! one low-priority fetch at a time, through the same acquisition path
//! as foreground reads. A fresher hint or an epoch change (a `clear()`)
//! abandons the current window.
//!
//! The worker holds only a `Weak` reference to the cache and exits when
//! the cache is dropped.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{trace, warn};

use super::Prefetch;
use super::core::CacheCore;
use crate::source::Record;

pub(crate) fn spawn<R: Record>(core: &Arc<CacheCore<R>>, mut hints: watch::Receiver<Option<u64>>) {
    let weak = Arc::downgrade(core);
    let prefetch = core.prefetch();
    tokio::spawn(async move {
        loop {
            if hints.changed().await.is_err() {
                return; // cache dropped
            }
            loop {
                let hint = *hints.borrow_and_update();
                let Some(core) = weak.upgrade() else {
                    return;
                };
                if let Some(from) = hint {
                    run_window(&core, from, prefetch, &hints).await;
                }
                if hints.has_changed().unwrap_or(false) {
                    continue; // a fresher hint arrived while we worked
                }
                core.worker_parked();
                break;
            }
        }
    });
}

/// Walk pages forward from `from` while budget remains and the
/// collection end has not been reached.
async fn run_window<R: Record>(
    core: &Arc<CacheCore<R>>,
    from: u64,
    prefetch: Prefetch,
    hints: &watch::Receiver<Option<u64>>,
) {
    let epoch = core.current_epoch();
    let page_size = core.page_size();
    let limit = match prefetch {
        Prefetch::Disabled => return,
        Prefetch::All => None,
        Prefetch::Lookahead(records) => Some(from.saturating_add(records)),
    };

    let mut page_start = (from / page_size) * page_size;
    loop {
        if core.current_epoch() != epoch {
            return; // cleared under us
        }
        if hints.has_changed().unwrap_or(true) {
            return; // restart from the fresher hint
        }
        if let Some(limit) = limit {
            if page_start >= limit {
                return;
            }
        }
        if let Some(end) = core.known_end() {
            if page_start >= end {
                return;
            }
        }
        match core.get_page(page_start, false).await {
            Ok(page) => {
                trace!(page = page_start, "prefetched page");
                if (page.records.len() as u64) < page_size {
                    return; // end of collection
                }
            }
            Err(e) if e.is_canceled() => return,
            Err(e) => {
                warn!(page = page_start, error = %e, "prefetch failed, abandoning window");
                return;
            }
        }
        let Some(next) = page_start.checked_add(page_size) else {
            return;
        };
        page_start = next;
        tokio::task::yield_now().await;
    }
}
