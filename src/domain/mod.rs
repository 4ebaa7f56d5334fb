//! Domain layer - token, session and transfer types with no I/O

pub mod history;
pub mod price;
pub mod session;
pub mod token;
pub mod units;

pub use history::{
    HistoryRow, HistoryView, TransferFailure, TransferHistory, TransferRecord, TransferStatus,
    EMPTY_HISTORY_MESSAGE,
};
pub use price::PriceFeed;
pub use session::Session;
pub use token::{
    short_address, TokenContract, TokenMetadata, DEPLOYER_ADDRESS, EXPECTED_CHAIN_ID,
    TOKEN_DECIMALS, TRACHYCOIN_ADDRESS,
};
pub use units::{format_units, format_units_rounded, parse_units, UnitsError};
