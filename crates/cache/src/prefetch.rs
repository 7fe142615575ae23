//! Bulk prefetch of every eligible document.

use crate::error::ErrorKind;
use crate::lock;
use crate::status::{LoadOutcome, LoadState};
use crate::store::DocumentCache;
use folio_source::DocumentMetadata;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::instrument;

/// Upper bound on concurrent content requests during prefetch. Keeps a full
/// warm-up under the rate limits of unauthenticated raw-file hosts.
pub const MAX_CONCURRENCY: usize = 5;

/// Counts from one [`fetch_all_contents`](DocumentCache::fetch_all_contents) run.
///
/// Carries no per-document detail. Callers that need to know
/// which document failed call [`fetch_content`](DocumentCache::fetch_content).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    /// Eligible documents taken off the queue (each exactly once).
    pub attempted: usize,
    /// Documents that ended up in the cache (including ones already there).
    pub fetched: usize,
    /// Documents whose fetch failed; each was logged with its key.
    pub failed: usize,
}

impl DocumentCache {
    /// Fetch the content of every Markdown, non-system document.
    ///
    /// Loads the index first if needed (waiting out a load already in flight
    /// elsewhere). If the index cannot be loaded, nothing is fetched and an
    /// empty summary is returned.
    ///
    /// Eligible documents are queued in index order and drained by
    /// `min(MAX_CONCURRENCY, queue length)` workers, each going through
    /// [`fetch_content`](Self::fetch_content), so already-cached documents
    /// cost nothing. A failed document is logged and skipped; it never stops
    /// its worker or the others. Returns once every worker has drained the
    /// queue.
    #[instrument(skip(self), fields(cache = %self.name()))]
    pub async fn fetch_all_contents(&self) -> PrefetchSummary {
        match self.load_index().await {
            Ok(LoadOutcome::InProgress) => {
                if self.wait_for_index().await.state != LoadState::Loaded {
                    tracing::debug!("Index load elsewhere failed, nothing to prefetch");
                    return PrefetchSummary::default();
                }
            },
            Ok(_) => {},
            Err(err) => {
                let kind: &ErrorKind = &err;
                tracing::debug!(error = %kind, "Index unavailable, nothing to prefetch");
                return PrefetchSummary::default();
            },
        }

        let queue = self.index().prefetch_queue();
        let attempted = queue.len();
        if attempted == 0 {
            tracing::debug!("No documents to prefetch");
            return PrefetchSummary::default();
        }

        let queue = Mutex::new(queue);
        let fetched = AtomicUsize::new(0);
        let workers = MAX_CONCURRENCY.min(attempted);
        tracing::debug!(attempted, workers, "Prefetching documents");

        let mut pool: FuturesUnordered<_> = (0..workers).map(|worker| self.drain(worker, &queue, &fetched)).collect();
        while pool.next().await.is_some() {}

        let fetched = fetched.load(Ordering::Relaxed);
        let summary = PrefetchSummary { attempted, fetched, failed: attempted - fetched };
        tracing::info!(attempted, fetched, failed = summary.failed, "Prefetch complete");
        summary
    }

    /// One prefetch worker: pop, fetch, repeat until the queue is empty.
    async fn drain(&self, worker: usize, queue: &Mutex<VecDeque<DocumentMetadata>>, fetched: &AtomicUsize) {
        loop {
            // Pop and release the lock before the fetch suspends.
            let next = lock::lock(queue, "prefetch").pop_front();
            let Some(document) = next else {
                break;
            };
            match self.fetch_content(&document.key).await {
                Ok(_) => {
                    fetched.fetch_add(1, Ordering::Relaxed);
                },
                Err(err) => {
                    let kind: &ErrorKind = &err;
                    tracing::warn!(worker, key = %document.key, error = %kind, "Failed to prefetch document");
                },
            }
        }
    }
}
