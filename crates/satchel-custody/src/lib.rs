//! Secret custody capability for the satchel wallet engine.
//!
//! Wallet secrets are encrypted and decrypted by the device's secure key
//! storage, behind the [`SecretVault`] trait. The engine itself never sees
//! plaintext: it stores the resulting [`EncryptedSecret`] alongside each
//! wallet record and compares custody public keys to detect that secure
//! storage was reset or replaced.
//!
//! [`InMemoryVault`] is a deterministic software backend for tests and
//! embedding; production builds inject a platform-specific implementation.
//!
//! [`EncryptedSecret`]: satchel_types::EncryptedSecret

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{CustodyError, CustodyResult};
pub use memory::InMemoryVault;
pub use traits::SecretVault;
