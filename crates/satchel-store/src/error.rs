//! Error types for store operations.

use thiserror::Error;

/// Errors surfaced by the typed store update paths.
///
/// Read paths never fail: missing or undecodable documents degrade to the
/// empty/default value. Disk-write failures are swallowed with the
/// in-memory copy staying authoritative, so the only caller-visible
/// failure is a document that cannot be encoded.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The updated document failed to encode; nothing was written.
    #[error("document encode failed: {0}")]
    Encode(String),
}

/// Convenience alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
