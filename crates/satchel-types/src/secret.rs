use serde::{Deserialize, Serialize};

/// An encrypted wallet secret, as produced by the device's secret custody
/// capability.
///
/// The engine never interprets either field. `ciphertext` is opaque by
/// construction; `public_key` identifies the custody key the secret was
/// encrypted under, and comparing it against the device's current custody
/// key is how consumers detect a secure-storage reset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    /// Public half of the custody key the secret was encrypted under.
    pub public_key: Vec<u8>,
    /// Opaque ciphertext.
    pub ciphertext: Vec<u8>,
}
