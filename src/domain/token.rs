//! TrachyCoin contract constants and typed ABI bindings

use alloy::primitives::{address, Address};
use alloy::sol;
use serde::Serialize;

/// Deployment address of the TrachyCoin contract on the dev chain.
pub const TRACHYCOIN_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Account that received the initial supply (Hardhat/Anvil account #0).
pub const DEPLOYER_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

/// The only chain the dashboard will operate on (Hardhat/Anvil dev chain).
pub const EXPECTED_CHAIN_ID: u64 = 31337;

/// Fixed-point precision of all token amounts.
pub const TOKEN_DECIMALS: u8 = 18;

pub const DEFAULT_TOKEN_NAME: &str = "TrachyCoin";
pub const DEFAULT_TOKEN_SYMBOL: &str = "TRCHY";

sol! {
    /// The subset of ERC-20 the dashboard talks to.
    interface ITrachyCoin {
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

/// Display metadata read from the contract at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            decimals: TOKEN_DECIMALS,
        }
    }
}

/// Handle to a deployed token contract.
///
/// Only built once bytecode has been confirmed at `address` on the expected chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenContract {
    pub address: Address,
    pub metadata: TokenMetadata,
}

impl TokenContract {
    pub fn new(address: Address, metadata: TokenMetadata) -> Self {
        Self { address, metadata }
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }
}

/// Shorten an address for display: `0x1234...abcd`.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
