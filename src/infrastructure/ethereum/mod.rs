//! Ethereum infrastructure - wallet provider over Alloy

mod provider;
pub(crate) mod types;

pub use provider::{connect_wallet, RpcWallet, SignerSource, WalletProvider};
pub use types::{
    Confirmation, ProviderConfig, ProviderError, ProviderEvent, WalletOptions, USER_REJECTED_CODE,
};
