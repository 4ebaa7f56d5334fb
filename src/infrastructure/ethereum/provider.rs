//! Wallet provider abstraction and the Alloy JSON-RPC implementation
//!
//! The session client only talks to `dyn WalletProvider`, so tests can script
//! a provider without a node. `RpcWallet` signs either with an account the
//! node manages (`eth_sendTransaction`) or with a local private key.

use std::time::Duration;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use tokio::sync::mpsc;
use tokio::time::interval;

use crate::config::SignerMode;
use crate::infrastructure::ethereum::types::{
    Confirmation, ProviderConfig, ProviderError, ProviderEvent, WalletOptions,
};

/// Lower bound for polling loops; `tokio::time::interval` rejects zero.
const MIN_POLL: Duration = Duration::from_millis(50);

/// Abstract wallet provider
///
/// Everything the session client needs from a wallet, independent of the
/// transport and of who holds the key.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync + 'static {
    /// Ask the wallet to authorize and list its accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Chain id the provider is currently on
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Deployed bytecode at `address` (empty if none)
    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError>;

    /// Account transactions are signed with
    async fn signer_address(&self) -> Result<Address, ProviderError>;

    /// Read-only contract call (eth_call)
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ProviderError>;

    /// Sign and submit a transaction, returning its hash once accepted
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, ProviderError>;

    /// Wait until `tx_hash` is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, ProviderError>;

    /// Account and network change notifications
    async fn subscribe(&self) -> Result<mpsc::Receiver<ProviderEvent>, ProviderError>;

    /// Get endpoint display name
    fn endpoint_name(&self) -> String;
}

/// Where signatures come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerSource {
    /// Unlocked account managed by the node, by position in `eth_accounts`
    Node { index: usize },
    /// Local private key; the provider signs before submitting
    LocalKey(Address),
}

/// JSON-RPC wallet backed by an erased Alloy provider
pub struct RpcWallet {
    provider: DynProvider,
    signer: SignerSource,
    endpoint: String,
    event_poll: Duration,
    receipt_poll: Duration,
}

impl std::fmt::Debug for RpcWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWallet")
            .field("signer", &self.signer)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl RpcWallet {
    pub fn signer(&self) -> SignerSource {
        self.signer
    }
}

/// Build a wallet provider for `endpoint`.
///
/// Construction never contacts the node for HTTP; WebSocket endpoints are
/// dialed immediately.
pub async fn connect_wallet(
    endpoint: &ProviderConfig,
    options: &WalletOptions,
) -> Result<RpcWallet, ProviderError> {
    let local_key = load_local_key(options)?;
    let signer = match &local_key {
        Some(key) => SignerSource::LocalKey(key.address()),
        None => SignerSource::Node {
            index: options.account_index,
        },
    };

    let wallet = local_key.map(EthereumWallet::from);
    let provider = match endpoint {
        ProviderConfig::Http(url) => {
            let rpc_url: Url = url
                .parse()
                .map_err(|e| ProviderError::Transport(format!("invalid HTTP URL {}: {}", url, e)))?;
            match wallet {
                Some(wallet) => ProviderBuilder::new()
                    .wallet(wallet)
                    .connect_http(rpc_url)
                    .erased(),
                None => ProviderBuilder::new().connect_http(rpc_url).erased(),
            }
        }
        ProviderConfig::WebSocket(url) => match wallet {
            Some(wallet) => ProviderBuilder::new()
                .wallet(wallet)
                .connect(url)
                .await?
                .erased(),
            None => ProviderBuilder::new().connect(url).await?.erased(),
        },
    };

    tracing::info!(
        endpoint = %endpoint.display(),
        websocket = endpoint.is_websocket(),
        signer = ?signer,
        "Wallet provider ready"
    );

    Ok(RpcWallet {
        provider,
        signer,
        endpoint: endpoint.display(),
        event_poll: options.event_poll.max(MIN_POLL),
        receipt_poll: options.receipt_poll.max(MIN_POLL),
    })
}

/// Resolve the local signing key according to the configured mode.
///
/// The key is never logged.
fn load_local_key(options: &WalletOptions) -> Result<Option<PrivateKeySigner>, ProviderError> {
    let raw = match options.signer {
        SignerMode::Node => return Ok(None),
        SignerMode::Auto => match std::env::var(&options.private_key_env) {
            Ok(value) if !value.trim().is_empty() => value,
            _ => return Ok(None),
        },
        SignerMode::LocalKey => std::env::var(&options.private_key_env).map_err(|_| {
            ProviderError::Rejected(format!(
                "environment variable {} not set",
                options.private_key_env
            ))
        })?,
    };

    let trimmed = raw.trim();
    let key_hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let signer: PrivateKeySigner = key_hex
        .parse()
        .map_err(|e| ProviderError::Rejected(format!("invalid private key format: {}", e)))?;
    Ok(Some(signer))
}

#[async_trait::async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        match self.signer {
            SignerSource::LocalKey(address) => Ok(vec![address]),
            SignerSource::Node { .. } => {
                let accounts = self.provider.get_accounts().await?;
                if accounts.is_empty() {
                    return Err(ProviderError::Rejected(
                        "node exposes no unlocked accounts".to_string(),
                    ));
                }
                Ok(accounts)
            }
        }
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes, ProviderError> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn signer_address(&self) -> Result<Address, ProviderError> {
        match self.signer {
            SignerSource::LocalKey(address) => Ok(address),
            SignerSource::Node { index } => {
                let accounts = self.provider.get_accounts().await?;
                accounts.get(index).copied().ok_or_else(|| {
                    ProviderError::Rejected(format!(
                        "node has no unlocked account at index {} ({} available)",
                        index,
                        accounts.len()
                    ))
                })
            }
        }
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, ProviderError> {
        let request = TransactionRequest::default().with_to(to).with_input(input);
        Ok(self.provider.call(request).await?)
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<TxHash, ProviderError> {
        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);
        let pending = self.provider.send_transaction(request).await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, from = %from, to = %to, "Transaction submitted");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, ProviderError> {
        let mut ticker = interval(self.receipt_poll);
        loop {
            ticker.tick().await;
            match self.provider.get_transaction_receipt(tx_hash).await? {
                Some(receipt) => {
                    return Ok(Confirmation {
                        tx_hash,
                        block_number: receipt.block_number,
                        success: receipt.status(),
                    });
                }
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
            }
        }
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<ProviderEvent>, ProviderError> {
        let (tx, rx) = mpsc::channel(16);
        let provider = self.provider.clone();
        let watch_accounts = matches!(self.signer, SignerSource::Node { .. });

        let mut last_chain = provider.get_chain_id().await?;
        let mut last_accounts = if watch_accounts {
            provider.get_accounts().await?
        } else {
            Vec::new()
        };

        // Plain JSON-RPC has no push notifications for these; poll instead.
        let poll = self.event_poll;
        tokio::spawn(async move {
            let mut ticker = interval(poll);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }

                match provider.get_chain_id().await {
                    Ok(chain_id) if chain_id != last_chain => {
                        tracing::info!(from = last_chain, to = chain_id, "Chain changed");
                        last_chain = chain_id;
                        if tx.send(ProviderEvent::ChainChanged(chain_id)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => tracing::debug!(error = %err, "Chain poll failed"),
                }

                if !watch_accounts {
                    continue;
                }
                match provider.get_accounts().await {
                    Ok(accounts) if accounts != last_accounts => {
                        tracing::info!(count = accounts.len(), "Accounts changed");
                        last_accounts = accounts.clone();
                        if tx
                            .send(ProviderEvent::AccountsChanged(accounts))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => tracing::debug!(error = %err, "Account poll failed"),
                }
            }
        });

        Ok(rx)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
