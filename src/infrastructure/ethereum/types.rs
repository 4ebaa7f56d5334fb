//! Provider-facing value types and error conversion

use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::transports::TransportError;
use thiserror::Error;

use crate::config::SignerMode;

/// JSON-RPC code wallets use when the user declines a request (EIP-1193).
pub const USER_REJECTED_CODE: i64 = 4001;

/// Errors surfaced by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider refused the request (user denial or no usable signer).
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        if let Some(payload) = err.as_error_resp() {
            let message = payload.message.to_string();
            if payload.code == USER_REJECTED_CODE || is_missing_signer(&message) {
                return ProviderError::Rejected(message);
            }
            return ProviderError::Rpc {
                code: payload.code,
                message,
            };
        }
        ProviderError::Transport(err.to_string())
    }
}

/// Dev nodes answer `eth_sendTransaction` from a locked or unknown account with
/// a generic RPC error; treat those as a refused signature.
fn is_missing_signer(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("user denied")
        || lower.contains("user rejected")
        || lower.contains("unknown account")
        || lower.contains("no signer")
}

/// Notifications pushed by the provider outside any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Endpoint the provider connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
        }
    }

    pub fn is_websocket(&self) -> bool {
        matches!(self, ProviderConfig::WebSocket(_))
    }
}

/// How the provider chooses and polls its signing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletOptions {
    pub signer: SignerMode,
    pub private_key_env: String,
    pub account_index: usize,
    pub event_poll: Duration,
    pub receipt_poll: Duration,
}

impl Default for WalletOptions {
    fn default() -> Self {
        Self {
            signer: SignerMode::Auto,
            private_key_env: crate::config::DEFAULT_PRIVATE_KEY_ENV.to_string(),
            account_index: 0,
            event_poll: Duration::from_millis(1000),
            receipt_poll: Duration::from_millis(500),
        }
    }
}
