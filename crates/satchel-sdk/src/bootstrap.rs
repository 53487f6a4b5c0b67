//! Startup decisions over engine snapshots.
//!
//! At launch the application combines the stored wallet records with the
//! device custody key to pick its first screen. The decision logic is
//! pure; the engine only guarantees that both inputs are accurate,
//! non-blocking snapshots.

use satchel_types::{ImportedWalletInfo, WalletInfo, WalletRecordInfo, WalletStateRecord};

/// Why secure storage can no longer open the stored wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    /// A custody key exists but differs from the one the wallet secret
    /// was encrypted under.
    KeyChanged,
    /// No usable custody key exists on this device.
    NotAvailable,
}

/// What the application should do first.
#[derive(Clone, Debug, PartialEq)]
pub enum StartupDisposition {
    /// A fully provisioned wallet is ready to show.
    ExistingWallet { info: WalletInfo },
    /// A wallet was created but the recovery-phrase export was never
    /// completed; resume that flow.
    WalletCreated { info: WalletInfo },
    /// An imported wallet is still awaiting on-chain confirmation.
    WalletImported { info: ImportedWalletInfo },
    /// A wallet record exists but its secret is unreachable.
    SecureStorageReset(ResetReason),
    /// No wallet yet; start the create/import flow.
    FreshStart,
    /// No wallet and no usable secure storage on this device.
    SecureStorageUnavailable,
}

/// Decide the startup disposition from the stored records and the current
/// custody public key.
///
/// Only the first record counts: it is the wallet the application shows.
pub fn assess_startup(
    records: &[WalletStateRecord],
    custody_key: Option<&[u8]>,
) -> StartupDisposition {
    let Some(record) = records.first() else {
        return if custody_key.is_some() {
            StartupDisposition::FreshStart
        } else {
            StartupDisposition::SecureStorageUnavailable
        };
    };

    let Some(custody_key) = custody_key else {
        return StartupDisposition::SecureStorageReset(ResetReason::NotAvailable);
    };
    if record.custody_public_key() != custody_key {
        return StartupDisposition::SecureStorageReset(ResetReason::KeyChanged);
    }

    match &record.info {
        WalletRecordInfo::Ready {
            info,
            export_completed: true,
            ..
        } => StartupDisposition::ExistingWallet { info: info.clone() },
        WalletRecordInfo::Ready { info, .. } => {
            StartupDisposition::WalletCreated { info: info.clone() }
        }
        WalletRecordInfo::Imported { info } => {
            StartupDisposition::WalletImported { info: info.clone() }
        }
    }
}

/// Wallet eligible to act on an external transfer link: the first record,
/// fully provisioned and encrypted under the current custody key.
pub fn transfer_ready_wallet(
    records: &[WalletStateRecord],
    custody_key: Option<&[u8]>,
) -> Option<WalletInfo> {
    let record = records.first()?;
    let custody_key = custody_key?;
    if record.custody_public_key() != custody_key {
        return None;
    }
    match &record.info {
        WalletRecordInfo::Ready {
            info,
            export_completed: true,
            ..
        } => Some(info.clone()),
        _ => None,
    }
}
