//! The engine facade.

use std::path::Path;
use std::sync::Arc;

use satchel_custody::SecretVault;
use satchel_resolver::{first_effective, ConfigFetcher, ConfigResolver, ResolverHandle, RetryPolicy};
use satchel_store::{ConfigStore, RecordStore};
use satchel_types::{EffectiveConfig, WalletInfo};
use tracing::debug;

use crate::bootstrap::{assess_startup, transfer_ready_wallet, StartupDisposition};

/// File name of the wallet-record document.
const RECORDS_FILE: &str = "records";
/// File name of the configuration document.
const CONFIG_FILE: &str = "configuration";

/// The assembled wallet engine.
///
/// Owns the two document stores under one base directory, keeps the
/// configuration resolver running, and carries the injected custody and
/// fetch capabilities. Dropping the `Satchel` stops the resolver.
pub struct Satchel {
    records: Arc<RecordStore>,
    config: Arc<ConfigStore>,
    vault: Arc<dyn SecretVault>,
    _resolver: ResolverHandle,
}

impl Satchel {
    /// Open (or create) the engine under `base_dir` and spawn the
    /// configuration resolver onto the current tokio runtime.
    pub fn open(
        base_dir: impl AsRef<Path>,
        vault: Arc<dyn SecretVault>,
        fetcher: Arc<dyn ConfigFetcher>,
    ) -> Self {
        Self::open_with_retry(base_dir, vault, fetcher, RetryPolicy::default())
    }

    /// Open with an explicit fetch retry policy.
    pub fn open_with_retry(
        base_dir: impl AsRef<Path>,
        vault: Arc<dyn SecretVault>,
        fetcher: Arc<dyn ConfigFetcher>,
        retry: RetryPolicy,
    ) -> Self {
        let base_dir = base_dir.as_ref();
        let records = Arc::new(RecordStore::open(base_dir.join(RECORDS_FILE)));
        let config = Arc::new(ConfigStore::open(base_dir.join(CONFIG_FILE)));
        let resolver = ConfigResolver::new(Arc::clone(&config), fetcher)
            .with_retry(retry)
            .spawn();

        debug!(base_dir = %base_dir.display(), "satchel opened");
        Self {
            records,
            config,
            vault,
            _resolver: resolver,
        }
    }

    /// The wallet-record store.
    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// The configuration store.
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The injected secret custody capability.
    pub fn vault(&self) -> &dyn SecretVault {
        self.vault.as_ref()
    }

    /// First usable configuration: cached when still valid, otherwise the
    /// first successful resolution. See
    /// [`first_effective`](satchel_resolver::first_effective) for the
    /// waiting behavior.
    pub async fn initial_configuration(&self) -> Option<EffectiveConfig> {
        first_effective(&self.config).await
    }

    /// Snapshot both startup inputs and decide the first screen.
    pub async fn startup_disposition(&self) -> StartupDisposition {
        let records = self.records.get_all();
        let custody_key = self.vault.encryption_public_key().await;
        assess_startup(&records, custody_key.as_deref())
    }

    /// Wallet eligible to act on an external transfer link, if any.
    pub async fn transfer_wallet(&self) -> Option<WalletInfo> {
        let records = self.records.get_all();
        let custody_key = self.vault.encryption_public_key().await;
        transfer_ready_wallet(&records, custody_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use satchel_custody::InMemoryVault;
    use satchel_resolver::ScriptedFetcher;
    use satchel_types::{
        ConfigSource, EncryptedSecret, NetworkDeclaration, WalletRecordInfo, WalletStateRecord,
    };
    use tokio::time::{timeout, Duration};

    use super::*;
    use crate::bootstrap::ResetReason;

    fn open_engine(dir: &Path, vault: Arc<InMemoryVault>) -> (Satchel, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let engine = Satchel::open(dir, vault, fetcher.clone());
        (engine, fetcher)
    }

    async fn provision_wallet(engine: &Satchel, export_completed: bool) {
        let secret = engine.vault().encrypt(b"seed words").await.unwrap();
        engine
            .records()
            .update_all(move |mut records| {
                records.push(WalletStateRecord {
                    info: WalletRecordInfo::Ready {
                        info: WalletInfo {
                            public_key: "wallet-pk".into(),
                            encrypted_secret: secret,
                        },
                        export_completed,
                        cached_state: None,
                    },
                });
                records
            })
            .unwrap();
    }

    #[tokio::test]
    async fn fresh_engine_starts_the_create_flow() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _fetcher) = open_engine(dir.path(), Arc::new(InMemoryVault::new()));

        assert_eq!(
            engine.startup_disposition().await,
            StartupDisposition::FreshStart
        );
        assert!(engine.transfer_wallet().await.is_none());
    }

    #[tokio::test]
    async fn provisioned_wallet_is_recognized_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(InMemoryVault::new());

        {
            let (engine, _fetcher) = open_engine(dir.path(), Arc::clone(&vault));
            provision_wallet(&engine, true).await;
        }

        let (engine, _fetcher) = open_engine(dir.path(), vault);
        assert!(matches!(
            engine.startup_disposition().await,
            StartupDisposition::ExistingWallet { .. }
        ));
        assert!(engine.transfer_wallet().await.is_some());
    }

    #[tokio::test]
    async fn custody_rotation_is_detected_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Arc::new(InMemoryVault::new());
        let (engine, _fetcher) = open_engine(dir.path(), Arc::clone(&vault));
        provision_wallet(&engine, true).await;

        vault.rotate();

        assert_eq!(
            engine.startup_disposition().await,
            StartupDisposition::SecureStorageReset(ResetReason::KeyChanged)
        );
        assert!(engine.transfer_wallet().await.is_none());
    }

    #[tokio::test]
    async fn initial_configuration_resolves_inline_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, fetcher) = open_engine(dir.path(), Arc::new(InMemoryVault::new()));

        engine
            .config()
            .update_merged(|mut config| {
                config.test_net.declaration = NetworkDeclaration {
                    source: ConfigSource::Inline("{\"net\":1}".into()),
                    custom_id: Some("sandbox".into()),
                };
                config
            })
            .unwrap();

        let effective = timeout(Duration::from_secs(2), engine.initial_configuration())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(effective.config_text, "{\"net\":1}");
        assert_eq!(effective.network_name, "sandbox");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn record_updates_reach_watchers() {
        let dir = tempfile::tempdir().unwrap();
        let (engine, _fetcher) = open_engine(dir.path(), Arc::new(InMemoryVault::new()));

        let mut stream = engine.records().watch_all();
        assert!(stream.recv().await.unwrap().is_empty());

        engine
            .records()
            .update_all(|mut records| {
                records.push(WalletStateRecord {
                    info: WalletRecordInfo::Ready {
                        info: WalletInfo {
                            public_key: "pk".into(),
                            encrypted_secret: EncryptedSecret {
                                public_key: vec![1],
                                ciphertext: vec![2],
                            },
                        },
                        export_completed: false,
                        cached_state: None,
                    },
                });
                records
            })
            .unwrap();

        let records = timeout(Duration::from_secs(2), stream.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
    }
}
