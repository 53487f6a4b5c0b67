//! High-level API for the satchel wallet engine.
//!
//! [`Satchel`] opens the two persisted documents under one base
//! directory, spawns the configuration resolver, and carries the injected
//! secret-custody and network-fetch capabilities. The startup helpers in
//! [`bootstrap`] turn engine snapshots into the decisions an application
//! shell acts on at launch.

pub mod bootstrap;
pub mod context;

pub use bootstrap::{assess_startup, transfer_ready_wallet, ResetReason, StartupDisposition};
pub use context::Satchel;

// Re-export key types
pub use satchel_custody::{InMemoryVault, SecretVault};
pub use satchel_resolver::{ConfigFetcher, HttpFetcher, RetryPolicy, ScriptedFetcher};
pub use satchel_store::{ConfigStore, RecordStore, StoreError};
pub use satchel_types::{
    EffectiveConfig, EncryptedSecret, WalletConfiguration, WalletInfo, WalletStateRecord,
};
