//! In-memory document source for testing.

use crate::DocumentSource;
use crate::error::{ErrorKind, Result};
use crate::models::DocumentMetadata;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// A failure the mock should report instead of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// No response at all.
    Transport,
    /// A response with this (non-success) status.
    Status(u16),
    /// A success status whose body cannot be read.
    Body,
}

impl MockFailure {
    fn raise(self, address: &str) -> crate::error::Error {
        exn::Exn::from(match self {
            MockFailure::Transport => ErrorKind::Transport(address.to_string()),
            MockFailure::Status(status) => ErrorKind::Status { status, reason: "Mock Failure".to_string() },
            MockFailure::Body => ErrorKind::Body(address.to_string()),
        })
    }
}

type Response = std::result::Result<Vec<u8>, MockFailure>;

/// In-memory document source for testing.
///
/// The index body and document bodies live in maps behind [`RwLock`]s, so
/// responses can be swapped mid-test (e.g. fail the first index load, then
/// succeed). Every request is recorded and every request yields to the
/// scheduler once, so concurrent callers interleave the way they would
/// against a real network.
///
/// Unknown addresses answer `404`.
///
/// # Examples
///
/// ```
/// use folio_source::{DocumentMetadata, DocumentSource, source::MockSource};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::with_index([DocumentMetadata::new("a", "A", "https://x/a.md")])
///     .with_document("https://x/a.md", "# A");
/// assert_eq!(source.fetch("https://x/a.md").await?, "# A");
/// assert_eq!(source.requests_for("https://x/a.md").await, 1);
/// # Ok(())
/// # }
/// ```
pub struct MockSource {
    name: String,
    index: RwLock<Response>,
    documents: RwLock<HashMap<String, Response>>,
    requests: RwLock<Vec<String>>,
    index_requests: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSource {
    /// Create a mock whose index serializes the given records.
    pub fn with_index(entries: impl IntoIterator<Item = DocumentMetadata>) -> Self {
        let entries: Vec<_> = entries.into_iter().collect();
        // Serializing plain strings and vectors cannot fail.
        let body = serde_json::to_vec(&entries).unwrap_or_default();
        Self::with_raw_index(body)
    }

    /// Create a mock whose index body is returned verbatim.
    pub fn with_raw_index(body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: "mock".to_string(),
            index: RwLock::new(Ok(body.into())),
            documents: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
            index_requests: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Change the name of the mock source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Serve `body` for requests to `address` (which must be normalized).
    pub fn with_document(mut self, address: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.documents.get_mut().insert(address.into(), Ok(body.into()));
        self
    }

    /// Fail requests to `address` (which must be normalized).
    pub fn with_failure(mut self, address: impl Into<String>, failure: MockFailure) -> Self {
        self.documents.get_mut().insert(address.into(), Err(failure));
        self
    }

    /// Fail index requests from now on.
    pub async fn fail_index(&self, failure: MockFailure) {
        *self.index.write().await = Err(failure);
    }

    /// Serve the given records for index requests from now on.
    pub async fn set_index(&self, entries: impl IntoIterator<Item = DocumentMetadata>) {
        let entries: Vec<_> = entries.into_iter().collect();
        *self.index.write().await = Ok(serde_json::to_vec(&entries).unwrap_or_default());
    }

    /// Serve `body` for requests to `address` from now on.
    pub async fn set_document(&self, address: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.documents.write().await.insert(address.into(), Ok(body.into()));
    }

    /// Number of index requests received.
    pub fn index_requests(&self) -> usize {
        self.index_requests.load(Ordering::SeqCst)
    }

    /// Every document address requested, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Number of document requests received for `address`.
    pub async fn requests_for(&self, address: &str) -> usize {
        self.requests.read().await.iter().filter(|requested| *requested == address).count()
    }

    /// Highest number of requests that were ever outstanding at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::with_index([])
    }
}

/// Decrements the in-flight gauge when a request finishes (or is dropped).
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_index(&self) -> Result<Vec<u8>> {
        let _guard = self.enter();
        self.index_requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.index.read().await.clone().map_err(|failure| failure.raise("index"))
    }

    async fn fetch(&self, address: &str) -> Result<String> {
        let _guard = self.enter();
        self.requests.write().await.push(address.to_string());
        tokio::task::yield_now().await;
        let response = self.documents.read().await.get(address).cloned();
        match response {
            Some(Ok(body)) => String::from_utf8(body).map_err(|_| exn::Exn::from(ErrorKind::Body(address.to_string()))),
            Some(Err(failure)) => Err(failure.raise(address)),
            None => Err(MockFailure::Status(404).raise(address)),
        }
    }
}
