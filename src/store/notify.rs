use alloy::primitives::TxHash;

use crate::core::NotifyLevel;
use crate::domain::{short_address, TransferStatus, DEPLOYER_ADDRESS, EXPECTED_CHAIN_ID};
use crate::infrastructure::runtime::RuntimeEvent;

/// Status-bar message derived from a runtime event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

impl Notification {
    fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// `0x1234abcd…9f00`
pub fn short_hash(hash: &TxHash) -> String {
    let full = format!("{:#x}", hash);
    format!("{}…{}", &full[..10], &full[full.len() - 4..])
}

/// What to tell the user about `event`, if anything.
pub fn notification_for(event: &RuntimeEvent) -> Option<Notification> {
    let note = match event {
        RuntimeEvent::Connecting => Notification::new(NotifyLevel::Info, "Connecting wallet…"),
        RuntimeEvent::Connected { session } => {
            let account = short_address(&session.account());
            if session.account() == DEPLOYER_ADDRESS {
                Notification::new(
                    NotifyLevel::Info,
                    format!("Connected {} on chain {}", account, session.chain_id()),
                )
            } else {
                Notification::new(
                    NotifyLevel::Warn,
                    format!(
                        "Connected {}; only the deployer account holds the initial supply",
                        account
                    ),
                )
            }
        }
        RuntimeEvent::ConnectFailed { error } => {
            Notification::new(NotifyLevel::Error, error.to_string())
        }
        RuntimeEvent::SessionUpdated { .. } => return None,
        RuntimeEvent::TransferSubmitted { tx_hash, .. } => Notification::new(
            NotifyLevel::Info,
            format!("Transaction sent: {} (waiting for confirmation)", short_hash(tx_hash)),
        ),
        RuntimeEvent::TransferRecorded { record } => match record.status {
            TransferStatus::Success => Notification::new(
                NotifyLevel::Info,
                format!(
                    "Transfer successful: {} TRCHY to {}",
                    record.amount,
                    short_address(&record.to)
                ),
            ),
            TransferStatus::Failed => Notification::new(
                NotifyLevel::Error,
                match &record.failure {
                    Some(failure) => format!("Transfer failed: {}", failure),
                    None => "Transfer failed".to_string(),
                },
            ),
        },
        RuntimeEvent::TransferRejected { error } => {
            Notification::new(NotifyLevel::Warn, error.to_string())
        }
        RuntimeEvent::EnvironmentReset => Notification::new(
            NotifyLevel::Warn,
            format!(
                "Network changed; session and history reset (expects chain {})",
                EXPECTED_CHAIN_ID
            ),
        ),
        RuntimeEvent::Error { message } => Notification::new(NotifyLevel::Error, message.clone()),
    };
    Some(note)
}
