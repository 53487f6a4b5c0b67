//! Error types for configuration fetching.

use thiserror::Error;

/// Errors surfaced by a [`ConfigFetcher`].
///
/// [`ConfigFetcher`]: crate::fetch::ConfigFetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout, non-success status, or missing payload.
    #[error("network error: {0}")]
    Network(String),
}

/// Convenience alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
