//! The byte-fetch capability and its backends.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};

/// Cancellable byte-fetch over a URL.
///
/// Cancellation is cooperative: dropping the returned future abandons the
/// transfer, and cancelling after completion is a no-op. Implementations
/// must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Fetch the full payload at `url`.
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>>;
}

/// HTTP implementation of [`ConfigFetcher`].
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Use an externally configured client (proxies, TLS settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!("unexpected status {status}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Deterministic [`ConfigFetcher`] for tests.
///
/// Responses are consumed front-to-back; once the script runs out, every
/// further fetch fails. The call counter makes fetch-dedup assertions
/// possible.
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<Vec<u8>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    /// A fetcher whose every call fails until responses are pushed.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful response.
    pub fn push_ok(&self, bytes: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .expect("script lock poisoned")
            .push_back(Ok(bytes.into()));
    }

    /// Queue a failed response.
    pub fn push_err(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .expect("script lock poisoned")
            .push_back(Err(message.into()));
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .expect("script lock poisoned")
            .pop_front();
        match next {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(message)) => Err(FetchError::Network(message)),
            None => Err(FetchError::Network(format!(
                "no scripted response for {url}"
            ))),
        }
    }
}
