//! In-memory custody backend for testing and ephemeral use.
//!
//! Not real cryptography: a reversible keystream stand-in that behaves
//! like hardware custody at the interface level, with a stable public
//! key, key-mismatch failures, an availability toggle, and simulated
//! user cancellation. Secrets do not survive the process.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::RngCore;
use satchel_types::EncryptedSecret;

use crate::error::{CustodyError, CustodyResult};
use crate::traits::SecretVault;

struct VaultState {
    key: [u8; 32],
    available: bool,
    cancel_next: bool,
}

/// Software implementation of [`SecretVault`].
pub struct InMemoryVault {
    state: Mutex<VaultState>,
}

impl InMemoryVault {
    /// Create a vault with a random custody key.
    pub fn new() -> Self {
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self::with_key(key)
    }

    /// Create a vault with a fixed custody key, for deterministic tests.
    pub fn with_key(key: [u8; 32]) -> Self {
        Self {
            state: Mutex::new(VaultState {
                key,
                available: true,
                cancel_next: false,
            }),
        }
    }

    /// The public key this vault currently reports, regardless of
    /// availability.
    pub fn public_key(&self) -> Vec<u8> {
        let state = self.state.lock().expect("vault lock poisoned");
        derive_public_key(&state.key)
    }

    /// Toggle whether the vault reports a usable key.
    pub fn set_available(&self, available: bool) {
        self.state.lock().expect("vault lock poisoned").available = available;
    }

    /// Make the next `decrypt` fail as if the user dismissed the prompt.
    pub fn cancel_next_decrypt(&self) {
        self.state.lock().expect("vault lock poisoned").cancel_next = true;
    }

    /// Replace the custody key, simulating a secure-storage reset.
    /// Secrets encrypted under the old key can no longer be decrypted.
    pub fn rotate(&self) {
        let mut state = self.state.lock().expect("vault lock poisoned");
        rand::thread_rng().fill_bytes(&mut state.key);
    }
}

impl Default for InMemoryVault {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().expect("vault lock poisoned");
        write!(
            f,
            "InMemoryVault(pk:{}, available:{})",
            hex::encode(&derive_public_key(&state.key)[..4]),
            state.available
        )
    }
}

#[async_trait]
impl SecretVault for InMemoryVault {
    async fn encryption_public_key(&self) -> Option<Vec<u8>> {
        let state = self.state.lock().expect("vault lock poisoned");
        state.available.then(|| derive_public_key(&state.key))
    }

    async fn encrypt(&self, plaintext: &[u8]) -> CustodyResult<EncryptedSecret> {
        let state = self.state.lock().expect("vault lock poisoned");
        if !state.available {
            return Err(CustodyError::Failed("no usable custody key".into()));
        }
        Ok(EncryptedSecret {
            public_key: derive_public_key(&state.key),
            ciphertext: keystream_apply(&state.key, plaintext),
        })
    }

    async fn decrypt(&self, secret: &EncryptedSecret) -> CustodyResult<Vec<u8>> {
        let mut state = self.state.lock().expect("vault lock poisoned");
        if state.cancel_next {
            state.cancel_next = false;
            return Err(CustodyError::Cancelled);
        }
        if !state.available {
            return Err(CustodyError::Failed("no usable custody key".into()));
        }
        if secret.public_key != derive_public_key(&state.key) {
            return Err(CustodyError::Failed(
                "secret was encrypted under a different custody key".into(),
            ));
        }
        Ok(keystream_apply(&state.key, &secret.ciphertext))
    }
}

fn derive_public_key(key: &[u8; 32]) -> Vec<u8> {
    key.iter().map(|b| b ^ 0x5a).collect()
}

/// Self-inverse transform: applying it twice with the same key restores
/// the input.
fn keystream_apply(key: &[u8; 32], input: &[u8]) -> Vec<u8> {
    input
        .iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()] ^ (i as u8))
        .collect()
}
