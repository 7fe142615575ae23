//! Remote providers for the document index and document contents.
//!
//! The [`DocumentSource`] trait is the seam between the cache and the network:
//! one request for the index, one request per document. Everything above it
//! (load state, caching, prefetching) lives in `folio-cache`.

mod address;
pub mod error;
mod models;
pub mod source;

pub use crate::address::normalize as normalize_address;
pub use crate::models::{DocumentMetadata, SYSTEM_KIND, parse_index};
pub use crate::source::DocumentSource;
use std::sync::Arc;

pub type SourceHandle = Arc<dyn DocumentSource + Send + Sync>;
