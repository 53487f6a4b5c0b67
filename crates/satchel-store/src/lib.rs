//! Single-writer document storage for the satchel wallet engine.
//!
//! The engine persists exactly two documents: the wallet-record list and
//! the network configuration. Each lives in its own [`DocumentStore`], a
//! file-backed byte blob whose reads, writes, read-modify-writes, and
//! subscriber notifications are all serialized through one lock, so
//! concurrent callers can never observe or produce a torn update.
//!
//! # Layers
//!
//! - [`DocumentStore`] — raw blob with get/set/update/watch
//! - [`RecordStore`] — the wallet-record list, decoded on read
//! - [`ConfigStore`] — the merged network configuration, decoded on read
//!
//! # Design Rules
//!
//! 1. Every read-modify-write holds the store lock for the whole
//!    operation; there is no separate lock-get/lock-set pair anywhere.
//! 2. Disk writes are atomic replaces (write-to-temp-then-rename); a crash
//!    mid-write never leaves a half-written document.
//! 3. A missing document is a valid empty state, never an error.
//! 4. Decode failures degrade to the empty/default value and are logged.
//! 5. Disk-write failures are logged and swallowed; the in-memory copy
//!    stays authoritative for the life of the process.
//! 6. Encode failures in the typed update paths are propagated and leave
//!    the document untouched.

pub mod config;
pub mod document;
pub mod error;
pub mod records;

pub use config::{ConfigStore, ConfigStream, DeclarationStream};
pub use document::{DocumentStore, DocumentStoreConfig, DocumentStream};
pub use error::{StoreError, StoreResult};
pub use records::{RecordStore, RecordStream};
