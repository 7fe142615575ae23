//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Source failures are raised into
//! these kinds so the tree keeps the underlying cause.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The index could not be fetched (transport failure or bad status).
    #[display("failed to fetch document index: {_0}")]
    IndexFetch(#[error(not(source))] String),
    /// The index was fetched but is not an array of document records.
    #[display("document index has an unexpected format: {_0}")]
    IndexFormat(#[error(not(source))] String),
    /// No document with this key exists in the loaded index.
    #[display("document not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// The document's index record has no usable address.
    #[display("invalid address for document: {_0}")]
    InvalidAddress(#[error(not(source))] String),
    /// The content request failed or was rejected.
    #[display("network request failed for document: {_0}")]
    Network(#[error(not(source))] String),
    /// The content response arrived but its body could not be read.
    #[display("failed to read content of document: {_0}")]
    ContentRead(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::IndexFetch(_) | Self::Network(_) | Self::ContentRead(_))
    }
}
