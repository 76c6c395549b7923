use crate::error::Result;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

/// Wire envelope every collection listing comes back in
#[derive(Debug, Deserialize)]
pub(crate) struct PageWire {
    #[serde(default)]
    pub list: Vec<Value>,
    #[serde(default)]
    #[allow(dead_code)]
    pub limit: i64,
    #[serde(default)]
    pub total: i64,
}

/// One fetched page, deserialized and bound
#[derive(Debug)]
pub(crate) struct Page<T> {
    pub records: Vec<T>,
    pub total: i64,
}

/// Closure fetching the page that starts at the given absolute offset
pub(crate) type FetchFn<T> = Box<dyn FnMut(i64) -> BoxFuture<'static, Result<Page<T>>> + Send>;

/// Lazily paged, forward-only view over a collection listing.
///
/// Nothing is fetched until the first record is asked for, and page `n + 1`
/// is requested only once page `n` is exhausted and the total reported by
/// the server says more records exist. The cursor only moves forward:
/// iterating again after a partial pass resumes where the previous one
/// stopped, it does not rewind.
///
/// Offsets index a live collection, so records created or deleted while
/// iterating can shift page boundaries; each page reflects the server's
/// answer at the time of its fetch, nothing more.
pub struct ForwardList<T> {
    fetch: FetchFn<T>,
    queue: VecDeque<T>,
    /// Length of the page currently being consumed
    page_len: i64,
    /// Total collection size as last reported by the server
    total: i64,
    /// Absolute offset of the first record of the current page
    offset: i64,
    started: bool,
    ended: bool,
    pages_fetched: usize,
}

impl<T> ForwardList<T> {
    pub(crate) fn new(start_offset: i64, fetch: FetchFn<T>) -> Self {
        ForwardList {
            fetch,
            queue: VecDeque::new(),
            page_len: 0,
            total: 0,
            offset: start_offset,
            started: false,
            ended: false,
            pages_fetched: 0,
        }
    }

    /// The next record, or `Ok(None)` once the listing is exhausted.
    /// Permanently `None` after that.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if self.ended {
                return Ok(None);
            }
            if let Some(record) = self.queue.pop_front() {
                return Ok(Some(record));
            }
            if !self.started {
                self.fetch_page(self.offset).await?;
                self.started = true;
                continue;
            }

            // current page exhausted
            let consumed = self.offset + self.page_len;
            if self.total <= consumed {
                self.ended = true;
                return Ok(None);
            }
            self.fetch_page(consumed).await?;
        }
    }

    /// Collect every remaining record into a vector, starting from the
    /// current cursor. The whole remainder is held in memory; narrow the
    /// listing with a filter when that is a concern.
    pub async fn drain(&mut self) -> Result<Vec<T>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of fetches so far that returned records
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// True once the listing is exhausted; stays true
    pub fn ended(&self) -> bool {
        self.ended
    }

    // the cursor only moves once the fetch succeeds, so a failed fetch
    // can be retried without skipping a page
    async fn fetch_page(&mut self, offset: i64) -> Result<()> {
        let page = (self.fetch)(offset).await?;
        self.offset = offset;
        if page.records.is_empty() {
            self.ended = true;
            return Ok(());
        }

        self.page_len = page.records.len() as i64;
        self.total = page.total;
        self.queue = page.records.into();
        self.pages_fetched += 1;
        debug!("received page with {} entries", self.page_len);
        Ok(())
    }
}
