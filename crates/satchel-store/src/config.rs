//! Typed store for the merged network-configuration document.
//!
//! Same stateless-projection shape as the record store, over a second
//! [`DocumentStore`] instance with its own file. A missing, empty, or
//! undecodable document reads as [`WalletConfiguration::default`].

use std::path::PathBuf;

use satchel_types::{
    ConfigSource, DeclarationSet, EffectiveConfig, EffectiveSource, ResolvedConfig,
    WalletConfiguration,
};
use tokio::sync::broadcast;
use tracing::warn;

use crate::document::{DocumentStore, DocumentStream};
use crate::error::{StoreError, StoreResult};

/// Store for the merged network configuration.
pub struct ConfigStore {
    store: DocumentStore,
}

impl ConfigStore {
    /// Open the configuration store backed by the document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocumentStore::open(path),
        }
    }

    /// Current merged configuration. Serves startup decisions that only
    /// need the first value.
    pub fn merged(&self) -> WalletConfiguration {
        decode_config(self.store.get().as_deref())
    }

    /// Subscribe to the merged configuration: current value first, then
    /// every change.
    pub fn watch_merged(&self) -> ConfigStream {
        ConfigStream {
            inner: self.store.watch(),
        }
    }

    /// Declaration-only stream with consecutive duplicates suppressed,
    /// for consumers that only react to intent changes.
    pub fn watch_declarations(&self) -> DeclarationStream {
        DeclarationStream {
            inner: self.watch_merged(),
            last: None,
        }
    }

    /// Atomically replace the configuration with `f(current)`.
    ///
    /// Same contract as the record store: encode failures leave the
    /// document unchanged, and an update that returns an equal value
    /// writes nothing (so watchers are not re-notified).
    pub fn update_merged(
        &self,
        f: impl FnOnce(WalletConfiguration) -> WalletConfiguration,
    ) -> StoreResult<WalletConfiguration> {
        self.store.update(|current| {
            let config = decode_config(current);
            let updated = f(config.clone());
            if updated == config {
                return (None, Ok(updated));
            }
            match serde_json::to_vec(&updated) {
                Ok(bytes) => (Some(bytes), Ok(updated)),
                Err(e) => (None, Err(StoreError::Encode(e.to_string()))),
            }
        })
    }

    /// Store a newly saved declaration set and, when the supplied
    /// resolution was produced for the declared source, the resolved
    /// value as well, in one atomic update.
    ///
    /// This is the path taken when the user saves a configuration that
    /// was validated (and therefore already resolved) before saving.
    pub fn apply_declaration(
        &self,
        declarations: DeclarationSet,
        resolved_source: ConfigSource,
        resolved_text: String,
    ) -> StoreResult<WalletConfiguration> {
        self.update_merged(move |mut current| {
            current.test_net.declaration = declarations.test_net;
            current.active_network = declarations.active_network;
            if current.test_net.declaration.source == resolved_source {
                current.test_net.resolved = Some(ResolvedConfig {
                    source: resolved_source,
                    text: resolved_text,
                });
            }
            current
        })
    }

    /// The configuration usable right now, if any.
    pub fn effective(&self) -> Option<EffectiveConfig> {
        self.merged().effective()
    }

    /// The declared source for the active network.
    pub fn effective_source(&self) -> EffectiveSource {
        self.merged().effective_source()
    }
}

/// Stream of configuration snapshots from [`ConfigStore::watch_merged`].
pub struct ConfigStream {
    inner: DocumentStream,
}

impl ConfigStream {
    /// Next snapshot, or `None` once the store has been dropped.
    pub async fn recv(&mut self) -> Option<WalletConfiguration> {
        loop {
            match self.inner.recv().await {
                Ok(bytes) => return Some(decode_config(bytes.as_deref())),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "configuration watcher lagged; skipping to latest");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Deduplicated declaration stream from [`ConfigStore::watch_declarations`].
pub struct DeclarationStream {
    inner: ConfigStream,
    last: Option<DeclarationSet>,
}

impl DeclarationStream {
    /// Next declaration set that differs from the previously delivered
    /// one, or `None` once the store has been dropped.
    pub async fn recv(&mut self) -> Option<DeclarationSet> {
        while let Some(config) = self.inner.recv().await {
            let declarations = config.declarations();
            if self.last.as_ref() != Some(&declarations) {
                self.last = Some(declarations.clone());
                return Some(declarations);
            }
        }
        None
    }
}

fn decode_config(bytes: Option<&[u8]>) -> WalletConfiguration {
    let Some(bytes) = bytes else {
        return WalletConfiguration::default();
    };
    if bytes.is_empty() {
        return WalletConfiguration::default();
    }
    match serde_json::from_slice(bytes) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "undecodable configuration document; using defaults");
            WalletConfiguration::default()
        }
    }
}
