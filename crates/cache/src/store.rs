//! The document cache: index loading, lookup, content fetching and inspection.

use crate::error::{ErrorKind, Result};
use crate::index::Index;
use crate::lock;
use crate::status::{LoadOutcome, LoadState, LoadStatus};
use exn::{OptionExt, ResultExt};
use folio_source::error::ErrorKind as SourceErrorKind;
use folio_source::{DocumentMetadata, SourceHandle, normalize_address, parse_index};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::instrument;

/// In-memory document index and content cache backed by a [`DocumentSource`](folio_source::DocumentSource).
///
/// One instance per cache namespace, created at startup and shared by
/// reference (or behind an [`Arc`]) with everything that reads documents. All
/// methods take `&self`; the index, the load status and the content map are
/// guarded independently and no guard is ever held across a network request.
///
/// # Lifecycle
/// 1. [`load_index`](Self::load_index) fetches the index once. Concurrent and
///    repeated calls collapse onto the first successful load.
/// 2. [`fetch_content`](Self::fetch_content) serves a document from memory, or
///    fetches and remembers it.
/// 3. [`fetch_all_contents`](Self::fetch_all_contents) warms the cache for
///    every Markdown, non-system document.
///
/// # Examples
///
/// ```no_run
/// use folio_cache::DocumentCache;
/// use folio_source::source::HttpSource;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = HttpSource::new("docs", "https://example.com/data/docs.json")?;
/// let cache = DocumentCache::new("docs", Arc::new(source));
/// cache.load_index().await?;
/// let text = cache.fetch_content("blog/20250924-test").await?;
/// assert!(cache.has_cached("blog/20250924-test"));
/// # Ok(())
/// # }
/// ```
pub struct DocumentCache {
    name: String,
    source: SourceHandle,
    index: RwLock<Arc<Index>>,
    status: watch::Sender<LoadStatus>,
    contents: RwLock<HashMap<String, Arc<str>>>,
}

impl DocumentCache {
    pub fn new(name: impl Into<String>, source: SourceHandle) -> Self {
        Self {
            name: name.into(),
            source,
            index: RwLock::new(Arc::new(Index::default())),
            status: watch::Sender::new(LoadStatus::default()),
            contents: RwLock::new(HashMap::new()),
        }
    }

    /// Name of the cache namespace (used for logging).
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Index
    // =========================================================================

    /// Load the document index, at most once.
    ///
    /// Returns immediately without a request if the index is already loaded
    /// or another call is loading it. Otherwise clears the last error, fetches
    /// the index and replaces the (empty) index with the fetched records.
    ///
    /// A failure is returned to this caller only. Everyone else observes it
    /// through [`status`](Self::status): the state falls back to
    /// [`NotLoaded`](LoadState::NotLoaded) with the message recorded, and the
    /// next call retries from scratch.
    #[instrument(skip(self), fields(cache = %self.name))]
    pub async fn load_index(&self) -> Result<LoadOutcome> {
        let mut skipped = None;
        self.status.send_if_modified(|status| match status.state {
            LoadState::Loaded => {
                skipped = Some(LoadOutcome::AlreadyLoaded);
                false
            },
            LoadState::Loading => {
                skipped = Some(LoadOutcome::InProgress);
                false
            },
            LoadState::NotLoaded => {
                status.state = LoadState::Loading;
                status.error = None;
                true
            },
        });
        if let Some(outcome) = skipped {
            tracing::debug!(?outcome, "Index load skipped");
            return Ok(outcome);
        }

        let mut guard = LoadingGuard { status: &self.status, armed: true };
        let result = self.fetch_index().await;
        guard.armed = false;

        match result {
            Ok(entries) => {
                let count = entries.len();
                *lock::write(&self.index, "load_index") = Arc::new(Index::new(entries));
                self.status.send_modify(|status| status.state = LoadState::Loaded);
                tracing::debug!(source = self.source.name(), count, "Index loaded");
                Ok(LoadOutcome::Fetched(count))
            },
            Err(err) => {
                let message = (*err).to_string();
                tracing::error!(source = self.source.name(), error = %message, "Failed to load document index");
                self.status.send_modify(|status| {
                    status.state = LoadState::NotLoaded;
                    status.error = Some(message);
                });
                Err(err)
            },
        }
    }

    async fn fetch_index(&self) -> Result<Vec<DocumentMetadata>> {
        let body = self.source.fetch_index().await.map_err(|err| {
            let detail = (*err).to_string();
            err.raise(ErrorKind::IndexFetch(detail))
        })?;
        parse_index(&body).map_err(|err| {
            let detail = (*err).to_string();
            err.raise(ErrorKind::IndexFormat(detail))
        })
    }

    /// Wait until no index load is in flight and return the settled status.
    pub async fn wait_for_index(&self) -> LoadStatus {
        let mut receiver = self.status.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        match receiver.wait_for(|status| status.state != LoadState::Loading).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    /// Snapshot of the load state and last load error.
    pub fn status(&self) -> LoadStatus {
        self.status.borrow().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.status.borrow().state == LoadState::Loaded
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().state == LoadState::Loading
    }

    /// Message of the most recent failed index load, if the last attempt failed.
    pub fn last_error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    /// Look up a document by key.
    ///
    /// Does not load anything: returns `None` until the index has been loaded.
    pub fn find(&self, key: &str) -> Option<DocumentMetadata> {
        lock::read(&self.index, "find").get(key).cloned()
    }

    /// All index records, in provider order.
    pub fn entries(&self) -> Vec<DocumentMetadata> {
        self.index().entries().to_vec()
    }

    /// Number of index records.
    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn index(&self) -> Arc<Index> {
        Arc::clone(&lock::read(&self.index, "index"))
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Get the text of one document, fetching and caching it on first use.
    ///
    /// A cached document is returned without a request. Otherwise the
    /// document's address is normalized and requested once; only a successful
    /// response is cached. Concurrent calls for the same uncached key each
    /// fetch independently and the last write wins.
    ///
    /// # Errors
    /// - [`NotFound`](ErrorKind::NotFound): the key is not in the loaded index.
    /// - [`InvalidAddress`](ErrorKind::InvalidAddress): the record has no usable address.
    /// - [`Network`](ErrorKind::Network): no response, or a non-success status.
    /// - [`ContentRead`](ErrorKind::ContentRead): the body could not be read.
    #[instrument(skip(self), fields(cache = %self.name))]
    pub async fn fetch_content(&self, key: &str) -> Result<Arc<str>> {
        let cached = lock::read(&self.contents, "fetch_content").get(key).cloned();
        if let Some(text) = cached {
            tracing::debug!("Content cache hit");
            return Ok(text);
        }

        let document = self.find(key).ok_or_raise(|| ErrorKind::NotFound(key.to_string()))?;
        let raw = document.address.as_deref().ok_or_raise(|| ErrorKind::InvalidAddress(key.to_string()))?;
        let address = normalize_address(raw).or_raise(|| ErrorKind::InvalidAddress(key.to_string()))?;

        tracing::debug!(%address, "Content cache miss, fetching");
        let text = self.source.fetch(&address).await.map_err(|err| {
            let kind = match &*err {
                SourceErrorKind::Body(_) => ErrorKind::ContentRead(key.to_string()),
                SourceErrorKind::InvalidAddress(_) => ErrorKind::InvalidAddress(key.to_string()),
                _ => ErrorKind::Network(key.to_string()),
            };
            err.raise(kind)
        })?;

        let text: Arc<str> = Arc::from(text);
        lock::write(&self.contents, "fetch_content").insert(key.to_string(), Arc::clone(&text));
        Ok(text)
    }

    /// Whether the text of `key` is in the content cache.
    pub fn has_cached(&self, key: &str) -> bool {
        lock::read(&self.contents, "has_cached").contains_key(key)
    }

    /// Number of cached documents.
    pub fn cached_len(&self) -> usize {
        lock::read(&self.contents, "cached_len").len()
    }

    /// Drop every cached document. The index and load status are untouched.
    pub fn clear_cache(&self) {
        let mut contents = lock::write(&self.contents, "clear_cache");
        tracing::debug!(cache = %self.name, cleared = contents.len(), "Content cache cleared");
        contents.clear();
    }
}

/// Puts the load state back to `NotLoaded` if a load is abandoned mid-flight
/// (its future dropped), so later calls are not locked out forever.
struct LoadingGuard<'a> {
    status: &'a watch::Sender<LoadStatus>,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.status.send_modify(|status| {
                status.state = LoadState::NotLoaded;
                status.error = Some("index load was cancelled".to_string());
            });
        }
    }
}
