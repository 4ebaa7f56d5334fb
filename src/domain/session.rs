//! Wallet session value type

use alloy::primitives::{Address, U256};
use serde::Serialize;

use super::token::{TokenContract, TokenMetadata, EXPECTED_CHAIN_ID, TOKEN_DECIMALS};
use super::units::format_units;

/// Snapshot of one connected wallet session.
///
/// Sessions are immutable: reconnecting, switching accounts, or refreshing the
/// balance all produce a new value that replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    account: Address,
    chain_id: u64,
    contract_deployed: bool,
    contract: Option<TokenContract>,
    balance: U256,
    endpoint: String,
}

impl Session {
    /// Build a session. The contract handle is discarded unless the contract is
    /// deployed and the chain is the expected one.
    pub fn new(
        account: Address,
        chain_id: u64,
        contract_deployed: bool,
        contract: Option<TokenContract>,
        balance: U256,
        endpoint: impl Into<String>,
    ) -> Self {
        let contract = contract.filter(|_| contract_deployed && chain_id == EXPECTED_CHAIN_ID);
        Self {
            account,
            chain_id,
            contract_deployed,
            contract,
            balance,
            endpoint: endpoint.into(),
        }
    }

    /// Same session with a freshly queried balance.
    pub fn with_balance(&self, balance: U256) -> Self {
        Self {
            balance,
            ..self.clone()
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_contract_deployed(&self) -> bool {
        self.contract_deployed
    }

    pub fn contract(&self) -> Option<&TokenContract> {
        self.contract.as_ref()
    }

    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn metadata(&self) -> TokenMetadata {
        self.contract
            .as_ref()
            .map(|c| c.metadata.clone())
            .unwrap_or_default()
    }

    /// Balance as a decimal string using the token's fixed precision.
    pub fn display_balance(&self) -> String {
        format_units(self.balance, TOKEN_DECIMALS)
    }
}
