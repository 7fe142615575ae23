//! In-memory document index and content cache.
//!
//! This crate holds the process-wide view of a remote document collection:
//! the index (which documents exist), whether it has been loaded, and the raw
//! text of every document fetched so far. Nothing is persisted; a new process
//! starts cold and warms up through [`DocumentCache::load_index`],
//! [`DocumentCache::fetch_content`] and [`DocumentCache::fetch_all_contents`].
//!
//! # Architecture
//! - **Index**: ordered records from the index provider, with O(1) key lookup.
//!   Loaded once; a failed load leaves it empty and can be retried.
//! - **Load status**: `NotLoaded → Loading → Loaded`, plus the last failure
//!   message, observable by any number of readers for UI feedback.
//! - **Content cache**: key → text, written only by successful fetches and
//!   emptied only by [`DocumentCache::clear_cache`].
//! - **Prefetch**: a fixed pool of at most [`MAX_CONCURRENCY`] workers draining
//!   a shared queue through the single-document path.

pub mod error;
mod index;
mod lock;
mod prefetch;
mod status;
mod store;

pub use crate::prefetch::{MAX_CONCURRENCY, PrefetchSummary};
pub use crate::status::{LoadOutcome, LoadState, LoadStatus};
pub use crate::store::DocumentCache;
