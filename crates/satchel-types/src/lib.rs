//! Foundation types for the satchel wallet engine.
//!
//! This crate provides the persisted data model shared by the storage and
//! resolution crates. Every other satchel crate depends on `satchel-types`.
//!
//! # Key Types
//!
//! - [`WalletStateRecord`] — One wallet identity known to the device
//! - [`EncryptedSecret`] — Opaque secret ciphertext plus the custody key it
//!   was encrypted under
//! - [`WalletConfiguration`] — The merged network-configuration document:
//!   declared intent plus the last persisted resolution
//! - [`EffectiveConfig`] — Derived projection of the configuration usable
//!   right now (never persisted)

pub mod config;
pub mod record;
pub mod secret;

pub use config::{
    ActiveNetwork, ConfigSource, DeclarationSet, EffectiveConfig, EffectiveSource,
    NetworkDeclaration, NetworkEntry, ResolvedConfig, WalletConfiguration, DEFAULT_CONFIG_URL,
};
pub use record::{ImportedWalletInfo, WalletInfo, WalletRecordInfo, WalletStateRecord};
pub use secret::EncryptedSecret;
