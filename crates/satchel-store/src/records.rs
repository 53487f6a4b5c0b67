//! Typed store for the wallet-record list.
//!
//! A stateless projection over one [`DocumentStore`]: records are decoded
//! on every read and encoded on every write. Missing or undecodable
//! documents read as an empty list; the store favors availability over
//! strictness and logs decode failures for diagnostics.

use std::path::PathBuf;

use satchel_types::WalletStateRecord;
use tokio::sync::broadcast;
use tracing::warn;

use crate::document::{DocumentStore, DocumentStream};
use crate::error::{StoreError, StoreResult};

/// Store for the ordered list of wallet identities known to the device.
pub struct RecordStore {
    store: DocumentStore,
}

impl RecordStore {
    /// Open the record store backed by the document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocumentStore::open(path),
        }
    }

    /// Current records; empty when no document exists or it fails to
    /// decode. Never blocks on anything but the store lock.
    pub fn get_all(&self) -> Vec<WalletStateRecord> {
        decode_records(self.store.get().as_deref())
    }

    /// Subscribe to the record list: current value first, then every
    /// change.
    pub fn watch_all(&self) -> RecordStream {
        RecordStream {
            inner: self.store.watch(),
        }
    }

    /// Atomically replace the record list with `f(current)`.
    ///
    /// Runs entirely inside the store lock, so concurrent updates are
    /// serialized and none is lost. If the updated list fails to encode,
    /// the document is left unchanged and the error is returned; an update
    /// that returns an identical list writes nothing.
    pub fn update_all(
        &self,
        f: impl FnOnce(Vec<WalletStateRecord>) -> Vec<WalletStateRecord>,
    ) -> StoreResult<Vec<WalletStateRecord>> {
        self.store.update(|current| {
            let records = decode_records(current);
            let updated = f(records.clone());
            if updated == records {
                return (None, Ok(updated));
            }
            match serde_json::to_vec(&updated) {
                Ok(bytes) => (Some(bytes), Ok(updated)),
                Err(e) => (None, Err(StoreError::Encode(e.to_string()))),
            }
        })
    }
}

/// Stream of record-list snapshots from [`RecordStore::watch_all`].
pub struct RecordStream {
    inner: DocumentStream,
}

impl RecordStream {
    /// Next snapshot, or `None` once the store has been dropped. A
    /// subscriber that lagged behind the channel capacity skips to the
    /// most recent snapshots.
    pub async fn recv(&mut self) -> Option<Vec<WalletStateRecord>> {
        loop {
            match self.inner.recv().await {
                Ok(bytes) => return Some(decode_records(bytes.as_deref())),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "record watcher lagged; skipping to latest");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

fn decode_records(bytes: Option<&[u8]>) -> Vec<WalletStateRecord> {
    let Some(bytes) = bytes else {
        return Vec::new();
    };
    if bytes.is_empty() {
        return Vec::new();
    }
    match serde_json::from_slice(bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "undecodable wallet-record document; treating as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use satchel_types::{EncryptedSecret, WalletInfo, WalletRecordInfo};

    use super::*;

    fn record(tag: u8) -> WalletStateRecord {
        WalletStateRecord {
            info: WalletRecordInfo::Ready {
                info: WalletInfo {
                    public_key: format!("pk-{tag}"),
                    encrypted_secret: EncryptedSecret {
                        public_key: vec![tag],
                        ciphertext: vec![tag; 4],
                    },
                },
                export_completed: false,
                cached_state: None,
            },
        }
    }

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("records"));
        (dir, store)
    }

    #[test]
    fn empty_store_reads_as_empty_list() {
        let (_dir, store) = temp_store();
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn append_then_read_back() {
        let (_dir, store) = temp_store();

        let updated = store
            .update_all(|mut records| {
                records.push(record(1));
                records
            })
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(store.get_all(), vec![record(1)]);
    }

    #[test]
    fn updates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");

        let store = RecordStore::open(&path);
        store
            .update_all(|mut records| {
                records.push(record(1));
                records.push(record(2));
                records
            })
            .unwrap();
        drop(store);

        let store = RecordStore::open(&path);
        assert_eq!(store.get_all(), vec![record(1), record(2)]);
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        fs::write(&path, b"not json at all").unwrap();

        let store = RecordStore::open(&path);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn watch_sees_initial_and_updates() {
        let (_dir, store) = temp_store();
        store
            .update_all(|mut r| {
                r.push(record(1));
                r
            })
            .unwrap();

        let mut stream = store.watch_all();
        store
            .update_all(|mut r| {
                r.push(record(2));
                r
            })
            .unwrap();

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            assert_eq!(stream.recv().await.unwrap(), vec![record(1)]);
            assert_eq!(stream.recv().await.unwrap(), vec![record(1), record(2)]);
        });
    }

    #[test]
    fn identity_update_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records");
        let store = RecordStore::open(&path);

        store.update_all(|records| records).unwrap();
        assert!(!path.exists());
    }

    // N concurrent appenders produce exactly N records, none lost or
    // duplicated.
    #[test]
    fn concurrent_appends_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordStore::open(dir.path().join("records")));

        let mut handles = Vec::new();
        for i in 0u8..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for j in 0..25 {
                    store
                        .update_all(|mut records| {
                            records.push(record(i * 25 + j));
                            records
                        })
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let records = store.get_all();
        assert_eq!(records.len(), 100);
        let mut keys: Vec<u8> = records.iter().map(|r| r.custody_public_key()[0]).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 100);
    }
}
