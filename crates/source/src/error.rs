//! Source Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[display("request to {_0} failed")]
    Transport(#[error(not(source))] String),
    /// The provider answered with a non-success status.
    #[display("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    /// The status was fine but the body could not be read or decoded.
    #[display("failed to read response body from {_0}")]
    Body(#[error(not(source))] String),
    /// The index body is not a JSON array of document records.
    #[display("malformed index: {_0}")]
    Format(#[error(not(source))] String),
    /// The address is empty or cannot be requested.
    #[display("invalid address: {_0:?}")]
    InvalidAddress(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Body(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Format(_) | Self::InvalidAddress(_) => false,
        }
    }
}
