//! Wallet session and token transfer client

mod client;
mod error;

pub use client::{parse_transfer, require_fields, SessionClient, SessionStatus};
pub use error::{BalanceError, ConnectError, TransferError};
