//! Document source trait and implementations.
//!
//! This module defines the `DocumentSource` trait, which provides a unified
//! interface for the two remote providers a document cache depends on: the
//! index provider and the content provider.

mod http;
#[cfg(feature = "mock")]
mod mock;

pub use self::http::HttpSource;
#[cfg(feature = "mock")]
pub use self::mock::{MockFailure, MockSource};
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for remote document providers.
///
/// Each call is exactly one outbound request. Implementations do not cache,
/// retry or de-duplicate; that is the caller's business.
///
/// # Failure classification
/// Implementations must report failures with the
/// [`ErrorKind`](crate::error::ErrorKind) that matches where the request
/// failed, because callers map them onto different error categories:
/// - [`Transport`](crate::error::ErrorKind::Transport): no response arrived.
/// - [`Status`](crate::error::ErrorKind::Status): a non-success response.
/// - [`Body`](crate::error::ErrorKind::Body): a success response whose body
///   could not be read (or, for [`fetch`](Self::fetch), decoded as UTF-8).
///
/// # Examples
///
/// ```no_run
/// use folio_source::{DocumentSource, error::Result, parse_index};
///
/// async fn count_documents(source: &dyn DocumentSource) -> Result<usize> {
///     let body = source.fetch_index().await?;
///     Ok(parse_index(&body)?.len())
/// }
/// ```
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Name of the configured source. Used for logging only.
    fn name(&self) -> &str;

    /// Fetch the raw index body from the configured index location.
    ///
    /// The body is returned unparsed; see [`parse_index`](crate::parse_index).
    async fn fetch_index(&self) -> Result<Vec<u8>>;

    /// Fetch the text of one document.
    ///
    /// `address` must already be normalized with
    /// [`normalize_address`](crate::normalize_address).
    async fn fetch(&self, address: &str) -> Result<String>;
}
