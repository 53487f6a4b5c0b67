//! Error types for secret custody operations.

use thiserror::Error;

/// Errors surfaced by a [`SecretVault`].
///
/// Custody failures are real failures: they propagate to the caller for
/// user-visible handling (retry prompts, reset flows) and are never
/// retried automatically by the engine.
///
/// [`SecretVault`]: crate::traits::SecretVault
#[derive(Debug, Error)]
pub enum CustodyError {
    /// The custody operation failed (no usable key, wrong key, or a
    /// platform failure).
    #[error("secret custody operation failed: {0}")]
    Failed(String),

    /// The user cancelled an authentication prompt.
    #[error("secret custody operation cancelled by the user")]
    Cancelled,
}

/// Convenience alias for custody operations.
pub type CustodyResult<T> = std::result::Result<T, CustodyError>;
