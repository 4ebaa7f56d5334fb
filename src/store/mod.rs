//! Dashboard state store
//!
//! The UI never mutates session data directly. Runtime events are folded
//! into a new `DashboardState` by `reduce`, and the old value is dropped.

mod notify;

use std::sync::Arc;

use crate::domain::{Session, TransferHistory};
use crate::infrastructure::runtime::RuntimeEvent;
use crate::session::SessionStatus;

pub use notify::{notification_for, short_hash, Notification};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub status: SessionStatus,
    pub session: Option<Arc<Session>>,
    pub history: TransferHistory,
    /// A transfer has been requested and not yet recorded or refused.
    pub transfer_pending: bool,
}

impl DashboardState {
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Same state, marked as waiting for a transfer outcome.
    pub fn with_transfer_pending(&self) -> Self {
        Self {
            transfer_pending: true,
            ..self.clone()
        }
    }
}

/// Compute the state that follows `event`.
pub fn reduce(state: &DashboardState, event: &RuntimeEvent) -> DashboardState {
    match event {
        RuntimeEvent::Connecting => DashboardState {
            status: SessionStatus::Connecting,
            session: None,
            ..state.clone()
        },
        RuntimeEvent::Connected { session } => DashboardState {
            status: SessionStatus::Connected,
            session: Some(session.clone()),
            ..state.clone()
        },
        RuntimeEvent::ConnectFailed { error } => DashboardState {
            status: SessionStatus::Failed(error.clone()),
            session: None,
            ..state.clone()
        },
        RuntimeEvent::SessionUpdated { session } => DashboardState {
            session: Some(session.clone()),
            ..state.clone()
        },
        RuntimeEvent::TransferSubmitted { .. } => state.with_transfer_pending(),
        RuntimeEvent::TransferRecorded { record } => DashboardState {
            history: state.history.with_record(record.clone()),
            transfer_pending: false,
            ..state.clone()
        },
        RuntimeEvent::TransferRejected { .. } => DashboardState {
            transfer_pending: false,
            ..state.clone()
        },
        RuntimeEvent::EnvironmentReset => DashboardState::default(),
        RuntimeEvent::Error { .. } => state.clone(),
    }
}

/// Holds the current state and swaps it on every dispatch.
#[derive(Debug, Default)]
pub struct Store {
    state: DashboardState,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn dispatch(&mut self, event: &RuntimeEvent) -> &DashboardState {
        self.state = reduce(&self.state, event);
        &self.state
    }

    /// Mark a transfer as requested. Returns false if one is already pending.
    pub fn begin_transfer(&mut self) -> bool {
        if self.state.transfer_pending {
            return false;
        }
        self.state = self.state.with_transfer_pending();
        true
    }
}
