//! Wallet identity records as persisted by the record store.

use serde::{Deserialize, Serialize};

use crate::secret::EncryptedSecret;

/// Identity of a wallet created on this device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Public key of the wallet itself, as issued by the chain client.
    pub public_key: String,
    /// Wallet secret, encrypted under the device custody key.
    pub encrypted_secret: EncryptedSecret,
}

/// Identity of a wallet imported from a recovery phrase.
///
/// The chain client upgrades an imported record to `Ready` once the
/// corresponding on-chain state has been confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedWalletInfo {
    /// Public key of the wallet itself.
    pub public_key: String,
    /// Wallet secret, encrypted under the device custody key.
    pub encrypted_secret: EncryptedSecret,
}

/// Lifecycle state of one wallet identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WalletRecordInfo {
    /// Fully provisioned wallet.
    Ready {
        info: WalletInfo,
        /// Whether the user completed the recovery-phrase export flow.
        export_completed: bool,
        /// Opaque chain-state snapshot cached by the chain client. The
        /// engine stores it verbatim and never inspects it.
        cached_state: Option<serde_json::Value>,
    },
    /// Imported wallet awaiting on-chain confirmation.
    Imported { info: ImportedWalletInfo },
}

/// One wallet identity known to the device.
///
/// Records are kept in insertion order across serialization. The engine
/// imposes no uniqueness constraint; matching a record against the live
/// custody key is the consumer's decision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletStateRecord {
    pub info: WalletRecordInfo,
}

impl WalletStateRecord {
    /// The encrypted secret carried by this record, regardless of variant.
    pub fn encrypted_secret(&self) -> &EncryptedSecret {
        match &self.info {
            WalletRecordInfo::Ready { info, .. } => &info.encrypted_secret,
            WalletRecordInfo::Imported { info } => &info.encrypted_secret,
        }
    }

    /// Custody public key this record's secret was encrypted under.
    pub fn custody_public_key(&self) -> &[u8] {
        &self.encrypted_secret().public_key
    }
}
