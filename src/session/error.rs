use alloy::primitives::Address;
use serde::Serialize;
use thiserror::Error;

use crate::infrastructure::ethereum::ProviderError;

/// Why `connect` did not produce a session.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ConnectError {
    #[error("no wallet provider available")]
    NoProvider,
    #[error("wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("TrachyCoin contract not found at {address}")]
    NotDeployed { address: Address },
    #[error("wallet rejected the request: {message}")]
    Rejected { message: String },
    #[error("connection failed: {message}")]
    Unknown { message: String },
}

impl From<ProviderError> for ConnectError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Rejected(message) => ConnectError::Rejected { message },
            other => ConnectError::Unknown {
                message: other.to_string(),
            },
        }
    }
}

/// Why a transfer was refused before anything was submitted.
///
/// Failures after submission are not errors: they are recorded as a
/// `Failed` transfer record instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TransferError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("wallet not connected")]
    NotConnected,
}

impl TransferError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TransferError::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("wallet not connected")]
    NotConnected,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
