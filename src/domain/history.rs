//! Transfer attempts and the most-recent-first history

use std::collections::VecDeque;
use std::fmt;

use alloy::primitives::{Address, TxHash, U256};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::token::short_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferStatus {
    Success,
    Failed,
}

impl TransferStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TransferStatus::Success => "Success",
            TransferStatus::Failed => "Failed",
        }
    }
}

/// Why a transfer attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TransferFailure {
    /// The input did not parse, or the provider refused or failed to submit the transaction.
    Submission(String),
    /// The transaction was submitted but its receipt could not be obtained or reported a revert.
    Confirmation(String),
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferFailure::Submission(reason) => write!(f, "submission failed: {}", reason),
            TransferFailure::Confirmation(reason) => write!(f, "confirmation failed: {}", reason),
        }
    }
}

/// One logged transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    pub timestamp: DateTime<Utc>,
    pub from: Address,
    pub to: Address,
    /// Amount as the user entered it.
    pub amount: String,
    /// Amount in base units as submitted on-chain.
    pub raw_amount: U256,
    pub status: TransferStatus,
    pub tx_hash: Option<TxHash>,
    pub failure: Option<TransferFailure>,
}

impl TransferRecord {
    pub fn succeeded(
        from: Address,
        to: Address,
        amount: impl Into<String>,
        raw_amount: U256,
        tx_hash: TxHash,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            from,
            to,
            amount: amount.into(),
            raw_amount,
            status: TransferStatus::Success,
            tx_hash: Some(tx_hash),
            failure: None,
        }
    }

    pub fn failed(
        from: Address,
        to: Address,
        amount: impl Into<String>,
        raw_amount: U256,
        tx_hash: Option<TxHash>,
        failure: TransferFailure,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            from,
            to,
            amount: amount.into(),
            raw_amount,
            status: TransferStatus::Failed,
            tx_hash,
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransferStatus::Success
    }
}

/// Append-only transfer log, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferHistory {
    records: VecDeque<TransferRecord>,
}

impl TransferHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt at the front of the log.
    pub fn record(&mut self, record: TransferRecord) {
        self.records.push_front(record);
    }

    /// A copy of this history with `record` prepended.
    pub fn with_record(&self, record: TransferRecord) -> Self {
        let mut next = self.clone();
        next.record(record);
        next
    }

    pub fn latest(&self) -> Option<&TransferRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One display row of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub time: String,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub status: TransferStatus,
}

/// What the history view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// Nothing recorded yet; show a hint instead of an empty table.
    Empty,
    Rows(Vec<HistoryRow>),
}

pub const EMPTY_HISTORY_MESSAGE: &str =
    "No transactions yet. Start transferring TrachyCoin to see your history!";

impl HistoryView {
    pub fn build(history: &TransferHistory, symbol: &str) -> Self {
        if history.is_empty() {
            return HistoryView::Empty;
        }
        let rows = history
            .iter()
            .map(|record| HistoryRow {
                time: record
                    .timestamp
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                from: short_address(&record.from),
                to: short_address(&record.to),
                amount: format!("{} {}", record.amount, symbol),
                status: record.status,
            })
            .collect();
        HistoryView::Rows(rows)
    }
}
