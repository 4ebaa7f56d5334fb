//! Wallet session client
//!
//! Owns the provider handle, the current `Session` and the transfer history.
//! Every state change replaces the session value; nothing is patched in place.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use alloy::sol_types::SolCall;
use tokio::sync::mpsc;

use crate::domain::token::{
    ITrachyCoin, TokenContract, TokenMetadata, DEPLOYER_ADDRESS, EXPECTED_CHAIN_ID,
    TOKEN_DECIMALS, TRACHYCOIN_ADDRESS,
};
use crate::domain::{parse_units, Session, TransferFailure, TransferHistory, TransferRecord};
use crate::infrastructure::ethereum::{ProviderError, ProviderEvent, WalletProvider};
use crate::session::error::{BalanceError, ConnectError, TransferError};

/// Connection lifecycle: disconnected -> connecting -> connected | failed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed(ConnectError),
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
            SessionStatus::Failed(_) => "failed",
        }
    }
}

pub struct SessionClient {
    provider: Option<Arc<dyn WalletProvider>>,
    session: Option<Arc<Session>>,
    status: SessionStatus,
    history: TransferHistory,
}

impl SessionClient {
    /// `provider` is `None` when no wallet could be constructed; every
    /// connect then fails with `NoProvider`.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            session: None,
            status: SessionStatus::Disconnected,
            history: TransferHistory::new(),
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.clone()
    }

    pub fn history(&self) -> &TransferHistory {
        &self.history
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Account and network change notifications from the provider, if any.
    pub async fn subscribe(&self) -> Option<mpsc::Receiver<ProviderEvent>> {
        let provider = self.provider.as_ref()?;
        match provider.subscribe().await {
            Ok(rx) => Some(rx),
            Err(err) => {
                tracing::warn!(error = %err, "Provider notifications unavailable");
                None
            }
        }
    }

    /// Establish a fresh session.
    ///
    /// The previous session is dropped first, so a failed attempt never
    /// leaves a stale contract handle behind.
    pub async fn connect(&mut self) -> Result<Arc<Session>, ConnectError> {
        self.session = None;
        self.status = SessionStatus::Connecting;

        match self.establish().await {
            Ok(session) => {
                let session = Arc::new(session);
                tracing::info!(
                    account = %session.account(),
                    chain_id = session.chain_id(),
                    balance = %session.display_balance(),
                    "Session connected"
                );
                if session.account() != DEPLOYER_ADDRESS {
                    tracing::debug!(account = %session.account(), "Connected account is not the deployer");
                }
                self.session = Some(session.clone());
                self.status = SessionStatus::Connected;
                Ok(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Connect failed");
                self.status = SessionStatus::Failed(err.clone());
                Err(err)
            }
        }
    }

    async fn establish(&self) -> Result<Session, ConnectError> {
        let provider = self.provider.as_ref().ok_or(ConnectError::NoProvider)?;

        let accounts = provider.request_accounts().await?;
        tracing::debug!(count = accounts.len(), "Accounts authorized");

        let chain_id = provider.chain_id().await?;
        if chain_id != EXPECTED_CHAIN_ID {
            return Err(ConnectError::WrongNetwork {
                expected: EXPECTED_CHAIN_ID,
                actual: chain_id,
            });
        }

        let code = provider.get_code(TRACHYCOIN_ADDRESS).await?;
        if code.is_empty() {
            return Err(ConnectError::NotDeployed {
                address: TRACHYCOIN_ADDRESS,
            });
        }

        let account = provider.signer_address().await?;
        let metadata = read_metadata(provider.as_ref(), TRACHYCOIN_ADDRESS).await;
        let contract = TokenContract::new(TRACHYCOIN_ADDRESS, metadata);
        let balance = query_balance(provider.as_ref(), TRACHYCOIN_ADDRESS, account).await?;

        Ok(Session::new(
            account,
            chain_id,
            true,
            Some(contract),
            balance,
            provider.endpoint_name(),
        ))
    }

    /// Transfer `amount` (decimal string) to `to` and record the attempt.
    pub async fn transfer(&mut self, to: &str, amount: &str) -> Result<TransferRecord, TransferError> {
        self.transfer_with(to, amount, |_| {}).await
    }

    /// Like `transfer`, calling `on_submitted` as soon as the provider
    /// accepts the transaction and before its receipt is awaited.
    ///
    /// Missing fields and a missing session are refused before anything is
    /// recorded. Every other attempt appends exactly one record: malformed
    /// input is logged as a failed submission without calling the provider,
    /// and the balance is re-queried only when the transfer succeeded.
    pub async fn transfer_with<F>(
        &mut self,
        to: &str,
        amount: &str,
        on_submitted: F,
    ) -> Result<TransferRecord, TransferError>
    where
        F: FnOnce(TxHash) + Send,
    {
        require_fields(to, amount)?;
        let session = self.session.clone().ok_or(TransferError::NotConnected)?;
        let contract = session
            .contract()
            .map(|c| c.address)
            .ok_or(TransferError::NotConnected)?;
        let provider = self.provider.clone().ok_or(TransferError::NotConnected)?;

        let from = session.account();
        let amount = amount.trim();
        let (recipient, raw_amount) = match parse_transfer(to, amount) {
            Ok(parsed) => parsed,
            Err(reason) => {
                tracing::warn!(
                    to = %to.trim(),
                    amount = %amount,
                    reason = %reason,
                    "Transfer input rejected"
                );
                let record = TransferRecord::failed(
                    from,
                    Address::from_str(to.trim()).unwrap_or(Address::ZERO),
                    amount,
                    U256::ZERO,
                    None,
                    TransferFailure::Submission(reason),
                );
                self.history.record(record.clone());
                return Ok(record);
            }
        };
        let input = ITrachyCoin::transferCall {
            to: recipient,
            amount: raw_amount,
        }
        .abi_encode();

        tracing::info!(from = %from, to = %recipient, amount = %amount, "Submitting transfer");

        let record = match provider.send_transaction(from, contract, input.into()).await {
            Err(err) => {
                tracing::warn!(error = %err, "Transfer submission failed");
                TransferRecord::failed(
                    from,
                    recipient,
                    amount,
                    raw_amount,
                    None,
                    TransferFailure::Submission(err.to_string()),
                )
            }
            Ok(tx_hash) => {
                on_submitted(tx_hash);
                match provider.wait_for_receipt(tx_hash).await {
                    Ok(confirmation) if confirmation.success => {
                        tracing::info!(
                            tx_hash = %tx_hash,
                            block = ?confirmation.block_number,
                            "Transfer confirmed"
                        );
                        TransferRecord::succeeded(from, recipient, amount, raw_amount, tx_hash)
                    }
                    Ok(_) => {
                        tracing::warn!(tx_hash = %tx_hash, "Transfer reverted");
                        TransferRecord::failed(
                            from,
                            recipient,
                            amount,
                            raw_amount,
                            Some(tx_hash),
                            TransferFailure::Confirmation("transaction reverted".to_string()),
                        )
                    }
                    Err(err) => {
                        tracing::warn!(tx_hash = %tx_hash, error = %err, "Transfer confirmation failed");
                        TransferRecord::failed(
                            from,
                            recipient,
                            amount,
                            raw_amount,
                            Some(tx_hash),
                            TransferFailure::Confirmation(err.to_string()),
                        )
                    }
                }
            }
        };

        self.history.record(record.clone());

        if record.is_success() {
            match query_balance(provider.as_ref(), contract, from).await {
                Ok(balance) => self.session = Some(Arc::new(session.with_balance(balance))),
                Err(err) => tracing::warn!(error = %err, "Balance refresh after transfer failed"),
            }
        }

        Ok(record)
    }

    /// Re-query the balance and replace the session. On failure the
    /// previous session is kept.
    pub async fn refresh_balance(&mut self) -> Result<Arc<Session>, BalanceError> {
        let session = self.session.clone().ok_or(BalanceError::NotConnected)?;
        let contract = session
            .contract()
            .map(|c| c.address)
            .ok_or(BalanceError::NotConnected)?;
        let provider = self.provider.clone().ok_or(BalanceError::NotConnected)?;

        let balance = query_balance(provider.as_ref(), contract, session.account()).await?;
        let next = Arc::new(session.with_balance(balance));
        self.session = Some(next.clone());
        Ok(next)
    }

    /// The wallet switched accounts: start over.
    pub async fn on_external_account_change(&mut self) -> Result<Arc<Session>, ConnectError> {
        tracing::info!("Account changed, reconnecting");
        self.connect().await
    }

    /// The wallet switched networks: drop everything, including history,
    /// then reconnect.
    pub async fn on_external_network_change(&mut self) -> Result<Arc<Session>, ConnectError> {
        tracing::info!("Network changed, resetting environment");
        self.reset();
        self.connect().await
    }

    fn reset(&mut self) {
        self.session = None;
        self.status = SessionStatus::Disconnected;
        self.history = TransferHistory::new();
    }
}

/// Refuse a transfer with a blank recipient or amount.
pub fn require_fields(to: &str, amount: &str) -> Result<(), TransferError> {
    if to.trim().is_empty() {
        return Err(TransferError::invalid("recipient address is required"));
    }
    if amount.trim().is_empty() {
        return Err(TransferError::invalid("amount is required"));
    }
    Ok(())
}

/// Parse recipient and amount into on-chain values. The error is the
/// reason stored on the failed record.
pub fn parse_transfer(to: &str, amount: &str) -> Result<(Address, U256), String> {
    let to = to.trim();
    let recipient =
        Address::from_str(to).map_err(|_| format!("invalid recipient address: {}", to))?;
    let raw_amount = parse_units(amount.trim(), TOKEN_DECIMALS)
        .map_err(|e| format!("invalid amount: {}", e))?;
    Ok((recipient, raw_amount))
}

async fn query_balance(
    provider: &dyn WalletProvider,
    contract: Address,
    owner: Address,
) -> Result<U256, ProviderError> {
    let input = ITrachyCoin::balanceOfCall { owner }.abi_encode();
    let output = provider.call(contract, input.into()).await?;
    ITrachyCoin::balanceOfCall::abi_decode_returns(&output)
        .map_err(|e| ProviderError::Decode(format!("balanceOf: {}", e)))
}

/// Read display metadata, falling back to defaults field by field.
async fn read_metadata(provider: &dyn WalletProvider, contract: Address) -> TokenMetadata {
    let defaults = TokenMetadata::default();

    let (name, symbol, decimals) = futures::join!(
        provider.call(contract, ITrachyCoin::nameCall {}.abi_encode().into()),
        provider.call(contract, ITrachyCoin::symbolCall {}.abi_encode().into()),
        provider.call(contract, ITrachyCoin::decimalsCall {}.abi_encode().into()),
    );

    let name = name
        .ok()
        .and_then(|out| ITrachyCoin::nameCall::abi_decode_returns(&out).ok())
        .unwrap_or(defaults.name);
    let symbol = symbol
        .ok()
        .and_then(|out| ITrachyCoin::symbolCall::abi_decode_returns(&out).ok())
        .unwrap_or(defaults.symbol);
    let decimals = decimals
        .ok()
        .and_then(|out| ITrachyCoin::decimalsCall::abi_decode_returns(&out).ok())
        .unwrap_or(defaults.decimals);

    if decimals != TOKEN_DECIMALS {
        tracing::warn!(
            reported = decimals,
            used = TOKEN_DECIMALS,
            "Contract reports unexpected decimals"
        );
    }

    TokenMetadata {
        name,
        symbol,
        decimals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fields() {
        assert!(matches!(
            require_fields("", "1.0"),
            Err(TransferError::InvalidInput { .. })
        ));
        assert!(matches!(
            require_fields("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "  "),
            Err(TransferError::InvalidInput { .. })
        ));
        // Malformed but present values pass; parsing decides later.
        assert!(require_fields("0x1234", "abc").is_ok());
    }

    #[test]
    fn test_parse_transfer_rejects_bad_values() {
        let err = parse_transfer("0x1234", "1.0").unwrap_err();
        assert!(err.contains("invalid recipient address"));
        let err = parse_transfer("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "abc").unwrap_err();
        assert!(err.contains("invalid amount"));
    }

    #[test]
    fn test_parse_transfer_scales_amount() {
        let (to, raw) =
            parse_transfer(" 0x70997970C51812dc3A010C7d01b50e0d17dc79C8 ", "5.0").unwrap();
        assert_eq!(
            to,
            Address::from_str("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap()
        );
        assert_eq!(raw, U256::from(5u64) * U256::from(10u64).pow(U256::from(18)));
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let mut client = SessionClient::new(None);
        let err = client.connect().await.unwrap_err();
        assert_eq!(err, ConnectError::NoProvider);
        assert_eq!(client.status(), &SessionStatus::Failed(ConnectError::NoProvider));
        assert!(client.session().is_none());
    }

    #[tokio::test]
    async fn test_transfer_without_session() {
        let mut client = SessionClient::new(None);
        let err = client
            .transfer("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "1.0")
            .await
            .unwrap_err();
        assert_eq!(err, TransferError::NotConnected);
        assert!(client.history().is_empty());
    }
}
