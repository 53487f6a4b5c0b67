use async_trait::async_trait;
use satchel_types::EncryptedSecret;

use crate::error::CustodyResult;

/// Device secret custody: opaque encrypt/decrypt over secure key storage.
///
/// Implementations must be thread-safe (`Send + Sync`). Operations may
/// suspend on user interaction (for example a biometric prompt), which is
/// why the whole trait is async even though software backends complete
/// immediately.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Public half of the device custody key.
    ///
    /// Returns `None` when no usable secure key exists on this device.
    /// Consumers compare this against the `public_key` stored in each
    /// wallet record to detect a secure-storage reset.
    async fn encryption_public_key(&self) -> Option<Vec<u8>>;

    /// Encrypt a wallet secret under the device custody key.
    async fn encrypt(&self, plaintext: &[u8]) -> CustodyResult<EncryptedSecret>;

    /// Decrypt a previously encrypted wallet secret.
    ///
    /// Fails with [`CustodyError::Cancelled`] when the user dismisses the
    /// platform authentication prompt.
    ///
    /// [`CustodyError::Cancelled`]: crate::error::CustodyError::Cancelled
    async fn decrypt(&self, secret: &EncryptedSecret) -> CustodyResult<Vec<u8>>;
}
