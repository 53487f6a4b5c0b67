//! The reactive resolution pipeline.

use std::sync::Arc;

use satchel_store::ConfigStore;
use satchel_types::{ActiveNetwork, ConfigSource, EffectiveConfig, ResolvedConfig, WalletConfiguration};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fetch::ConfigFetcher;
use crate::retry::{fetch_with_retry, RetryPolicy};

/// Everything a resolution step is computed from, known before any I/O.
///
/// `raw` carries the inline text when the source needs no fetch; for URL
/// sources it stays `None` until fetched, so two emissions for the same
/// declaration compare equal and the second never reaches the network.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ResolutionKey {
    source: ConfigSource,
    network_name: String,
    active_network: ActiveNetwork,
    raw: Option<String>,
}

impl ResolutionKey {
    fn from_configuration(config: &WalletConfiguration) -> Self {
        let source_info = config.effective_source();
        let raw = match &source_info.source {
            ConfigSource::Inline(text) => Some(text.clone()),
            ConfigSource::Url(_) => None,
        };
        Self {
            source: source_info.source,
            network_name: source_info.network_name,
            active_network: config.active_network,
            raw,
        }
    }
}

/// Keeps the persisted resolution in sync with the configuration
/// declaration.
///
/// The pipeline processes configuration emissions one at a time: a
/// declaration change that lands while a fetch is in flight is handled
/// right after it, and the stale resolution is discarded by re-checking
/// the stored declaration inside the atomic update. Fetch failures leave
/// the previous resolution untouched.
pub struct ConfigResolver {
    store: Arc<ConfigStore>,
    fetcher: Arc<dyn ConfigFetcher>,
    retry: RetryPolicy,
}

impl ConfigResolver {
    pub fn new(store: Arc<ConfigStore>, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        Self {
            store,
            fetcher,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the fetch retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Spawn the pipeline onto the current tokio runtime.
    pub fn spawn(self) -> ResolverHandle {
        ResolverHandle {
            task: tokio::spawn(self.run()),
        }
    }

    /// Drive the pipeline until the configuration store goes away.
    pub async fn run(self) {
        let mut stream = self.store.watch_merged();
        let mut last: Option<ResolutionKey> = None;
        debug!("configuration resolver started");
        while let Some(configuration) = stream.recv().await {
            self.step(configuration, &mut last).await;
        }
        debug!("configuration resolver stopped");
    }

    async fn step(&self, configuration: WalletConfiguration, last: &mut Option<ResolutionKey>) {
        let key = ResolutionKey::from_configuration(&configuration);
        if last.as_ref() == Some(&key) {
            debug!(network = %key.network_name, "declaration unchanged; skipping resolution");
            return;
        }

        let text = match &key.source {
            ConfigSource::Inline(text) => text.clone(),
            ConfigSource::Url(url) => {
                let bytes = match fetch_with_retry(self.fetcher.as_ref(), url, &self.retry).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(url, error = %e, "configuration fetch failed; keeping previous resolution");
                        return;
                    }
                };
                match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!(url, "fetched configuration is not valid UTF-8; keeping previous resolution");
                        return;
                    }
                }
            }
        };

        *last = Some(key.clone());
        let result = self.store.update_merged(move |mut current| {
            // The declaration may have changed while the fetch was in
            // flight; resolution only applies to the declaration it was
            // computed against.
            if current.test_net.declaration.source == key.source {
                current.test_net.resolved = Some(ResolvedConfig {
                    source: key.source,
                    text,
                });
            } else {
                debug!(network = %key.network_name, "declaration changed during resolution; discarding stale value");
            }
            current
        });
        if let Err(e) = result {
            warn!(error = %e, "failed to persist resolved configuration");
        }
    }
}

/// Handle to a spawned [`ConfigResolver`].
///
/// Dropping the handle stops the pipeline and cancels any in-flight
/// fetch.
pub struct ResolverHandle {
    task: JoinHandle<()>,
}

impl ResolverHandle {
    /// Stop the pipeline.
    pub fn shutdown(self) {
        self.task.abort();
    }

    /// Whether the pipeline task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ResolverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// First usable configuration for startup.
///
/// Completes immediately, without touching the network, when the
/// persisted resolution is still valid for the current declaration.
/// Otherwise it waits for the first valid configuration produced by a
/// running [`ConfigResolver`] on the same store; callers that need a
/// bound wrap this in a timeout. Returns `None` only once the store has
/// been dropped.
pub async fn first_effective(store: &ConfigStore) -> Option<EffectiveConfig> {
    let mut stream = store.watch_merged();
    while let Some(configuration) = stream.recv().await {
        if let Some(effective) = configuration.effective() {
            return Some(effective);
        }
    }
    None
}
