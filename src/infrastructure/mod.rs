//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The wallet provider trait and its Alloy JSON-RPC implementation
//! - Tokio runtime bridge for async operations
//! - Tracing subscriber setup

pub mod ethereum;
pub mod logging;
pub mod runtime;

pub use ethereum::{ProviderConfig, WalletProvider};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
