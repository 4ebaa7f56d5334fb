//! Actions the key handler returns to the main loop

/// Side effects requested by the app after handling input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action needed
    None,

    /// Ask the worker to connect the wallet
    Connect,

    /// Ask the worker to re-query the balance
    RefreshBalance,

    /// Ask the worker to submit a transfer
    Transfer { to: String, amount: String },

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
