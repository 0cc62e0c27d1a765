//! Sequential predicate scans over the logical collection.
//!
//! Both directions scan strictly through [`DataCache::read_range`], so
//! scans populate the cache, respect the dedup invariant, and never
//! touch the store directly. Reads are chunked to page boundaries so
//! each underlying page is fetched at most once per scan.

use super::{DataCache, Indexed};
use crate::error::Result;
use crate::source::Record;

impl<R: Record> DataCache<R> {
    /// Scan forward from `index`, collecting records the predicate
    /// accepts, until `limit` matches are found (`None` = all matches)
    /// or the collection ends. Matches carry their logical index, in
    /// increasing order.
    pub async fn filter_forward<P>(
        &self,
        index: u64,
        limit: Option<usize>,
        predicate: P,
    ) -> Result<Vec<Indexed<R>>>
    where
        P: Fn(&R) -> bool + Send,
    {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        let page_size = self.core.page_size();
        let mut matches = Vec::new();
        let mut pos = index;
        loop {
            // Stay inside one page per read so a scan fetches each page
            // exactly once.
            let take = page_size - (pos % page_size);
            let records = self.read_range(pos, take).await?;
            for (offset, record) in records.iter().enumerate() {
                if predicate(record) {
                    matches.push(Indexed {
                        index: pos + offset as u64,
                        record: record.clone(),
                    });
                    if limit.is_some_and(|l| matches.len() >= l) {
                        return Ok(matches);
                    }
                }
            }
            if (records.len() as u64) < take {
                return Ok(matches); // ran off the end
            }
            pos += take;
        }
    }

    /// Scan backward from `index` (inclusive) toward index 0, collecting
    /// records the predicate accepts, until `limit` matches are found
    /// (`None` = all matches) or index 0 has been visited. Matches carry
    /// their logical index, in decreasing (visit) order.
    ///
    /// An `index` at or past the collection end yields no matches.
    pub async fn filter_back<P>(
        &self,
        index: u64,
        limit: Option<usize>,
        predicate: P,
    ) -> Result<Vec<Indexed<R>>>
    where
        P: Fn(&R) -> bool + Send,
    {
        if limit == Some(0) {
            return Ok(Vec::new());
        }
        let page_size = self.core.page_size();
        let mut matches = Vec::new();
        let mut pos = index;
        let mut first = true;
        loop {
            let page_start = (pos / page_size) * page_size;
            let want = pos - page_start + 1;
            let records = self.read_range(page_start, want).await?;
            if first {
                if (records.len() as u64) < want {
                    // The start index itself is past the collection end.
                    return Ok(Vec::new());
                }
                first = false;
            }
            for (offset, record) in records.iter().enumerate().rev() {
                if predicate(record) {
                    matches.push(Indexed {
                        index: page_start + offset as u64,
                        record: record.clone(),
                    });
                    if limit.is_some_and(|l| matches.len() >= l) {
                        return Ok(matches);
                    }
                }
            }
            if page_start == 0 {
                return Ok(matches);
            }
            pos = page_start - 1;
        }
    }
}
