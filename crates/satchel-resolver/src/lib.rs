//! Configuration resolution for the satchel wallet engine.
//!
//! The network configuration is declared as either a remote URL or inline
//! text. This crate keeps the persisted *resolved* value in sync with that
//! declaration: it watches the configuration store, fetches remote content
//! with a bounded retry policy, deduplicates redundant work, and discards
//! resolutions whose declaration changed while the fetch was in flight.
//!
//! # Key Types
//!
//! - [`ConfigResolver`] — The reactive pipeline; spawn it once per process
//! - [`ConfigFetcher`] — Injected byte-fetch capability ([`HttpFetcher`]
//!   for production, [`ScriptedFetcher`] for tests)
//! - [`RetryPolicy`] — Bounded retry with capped exponential backoff
//! - [`first_effective`] — Startup path: cached configuration when valid,
//!   otherwise the first successful resolution

pub mod error;
pub mod fetch;
pub mod resolver;
pub mod retry;

pub use error::{FetchError, FetchResult};
pub use fetch::{ConfigFetcher, HttpFetcher, ScriptedFetcher};
pub use resolver::{first_effective, ConfigResolver, ResolverHandle};
pub use retry::RetryPolicy;
