use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::{debug, warn};

/// A per-subscriber stream of document snapshots.
///
/// The first received value is the document's current contents at
/// subscription time; every later value is the payload of a subsequent
/// write, in write order. `None` means the document does not exist.
pub type DocumentStream = broadcast::Receiver<Option<Vec<u8>>>;

/// Configuration for a [`DocumentStore`].
#[derive(Clone, Debug)]
pub struct DocumentStoreConfig {
    /// Capacity of per-subscriber broadcast channels. A subscriber that
    /// falls further behind than this sees a lag notification instead of
    /// the missed snapshots.
    pub channel_capacity: usize,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Mutable state owned by the store lock.
struct DocumentState {
    /// Cached document contents. Meaningful only once `loaded` is set.
    data: Option<Vec<u8>>,
    /// Whether `data` has been populated from durable storage.
    loaded: bool,
    /// One broadcast sender per live subscriber. Closed subscribers are
    /// pruned during notification.
    subscribers: Vec<broadcast::Sender<Option<Vec<u8>>>>,
}

/// Single-writer, file-backed blob store.
///
/// Owns one serialized document on disk. Reads, writes,
/// read-modify-writes, subscriber registration, and subscriber
/// notification all acquire the same lock exactly once for the whole
/// operation, so concurrent callers are totally ordered and can never
/// interleave inside a read-modify-write.
///
/// Disk writes use an atomic replace (write to a temp file in the same
/// directory, then rename), so a crash mid-write never leaves a
/// half-written document. A failed disk write is logged and swallowed:
/// the in-memory copy is updated regardless and remains authoritative for
/// the life of the process.
pub struct DocumentStore {
    path: PathBuf,
    config: DocumentStoreConfig,
    state: Mutex<DocumentState>,
}

impl DocumentStore {
    /// Create a store for the document at `path`. No I/O happens until the
    /// first read; a missing file is a valid empty state.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_config(path, DocumentStoreConfig::default())
    }

    /// Create a store with explicit configuration.
    pub fn with_config(path: impl Into<PathBuf>, config: DocumentStoreConfig) -> Self {
        Self {
            path: path.into(),
            config,
            state: Mutex::new(DocumentState {
                data: None,
                loaded: false,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Current document contents, or `None` if no document exists.
    ///
    /// The first call loads from durable storage and caches the result;
    /// subsequent calls are O(1).
    pub fn get(&self) -> Option<Vec<u8>> {
        let mut state = self.state.lock().expect("document store lock poisoned");
        self.load(&mut state);
        state.data.clone()
    }

    /// Replace the document.
    ///
    /// Updates the cache, writes the new contents to disk with an atomic
    /// replace, and notifies every live subscriber, in that order and all
    /// under one lock acquisition.
    pub fn set(&self, bytes: Vec<u8>) {
        let mut state = self.state.lock().expect("document store lock poisoned");
        self.set_locked(&mut state, bytes);
    }

    /// Atomic read-modify-write.
    ///
    /// `f` receives the current contents and runs entirely inside the
    /// store lock, so no other `set` or `update` can interleave. Returning
    /// `Some(bytes)` replaces the document exactly like [`set`]; returning
    /// `None` leaves the document, the cache, and subscribers untouched
    /// (used by the typed layers to decline a write on encode failure or
    /// when nothing changed).
    ///
    /// [`set`]: DocumentStore::set
    pub fn update<T>(&self, f: impl FnOnce(Option<&[u8]>) -> (Option<Vec<u8>>, T)) -> T {
        let mut state = self.state.lock().expect("document store lock poisoned");
        self.load(&mut state);
        let (replacement, result) = f(state.data.as_deref());
        if let Some(bytes) = replacement {
            self.set_locked(&mut state, bytes);
        }
        result
    }

    /// Subscribe to document changes.
    ///
    /// The current contents are delivered immediately (they are buffered
    /// in the channel before the receiver is handed out), followed by the
    /// payload of every subsequent write, in order. Unsubscribing is
    /// dropping the receiver; the dead sender is pruned during a later
    /// notification, under the store lock.
    pub fn watch(&self) -> DocumentStream {
        let mut state = self.state.lock().expect("document store lock poisoned");
        self.load(&mut state);
        let (tx, rx) = broadcast::channel(self.config.channel_capacity);
        // The receiver already exists, so this send cannot fail.
        let _ = tx.send(state.data.clone());
        state.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let state = self.state.lock().expect("document store lock poisoned");
        state.subscribers.len()
    }

    /// Path of the underlying document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self, state: &mut DocumentState) {
        if state.loaded {
            return;
        }
        state.data = match fs::read(&self.path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read document; treating as missing");
                None
            }
        };
        state.loaded = true;
    }

    fn set_locked(&self, state: &mut DocumentState, bytes: Vec<u8>) {
        if let Err(e) = self.persist(&bytes) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "document write failed; in-memory copy kept"
            );
        }
        state.data = Some(bytes);
        state.loaded = true;

        let snapshot = state.data.clone();
        state
            .subscribers
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
        debug!(
            path = %self.path.display(),
            subscribers = state.subscribers.len(),
            "document updated"
        );
    }

    /// Write-to-temp-then-rename in the document's directory.
    fn persist(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
