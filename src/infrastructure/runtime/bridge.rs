//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The worker thread owns the one `SessionClient`. The UI talks to it only
//! through commands and reads back events, so session state has a single
//! owner and every change arrives as a message.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use alloy::primitives::TxHash;

use crate::domain::{Session, TransferRecord};
use crate::infrastructure::ethereum::{ProviderConfig, WalletOptions, WalletProvider};
use crate::infrastructure::runtime::worker::{run_async_worker, ProviderSource};
use crate::session::{ConnectError, TransferError};

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCommand {
    /// Connect (or reconnect) the wallet session
    Connect,
    /// Transfer tokens from the session account
    Transfer { to: String, amount: String },
    /// Re-query the token balance
    RefreshBalance,
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A connect attempt started
    Connecting,
    /// A fresh session is available
    Connected { session: Arc<Session> },
    /// The connect attempt failed; there is no session
    ConnectFailed { error: ConnectError },
    /// The session was replaced (balance refresh)
    SessionUpdated { session: Arc<Session> },
    /// The provider accepted a transfer; the receipt is still pending
    TransferSubmitted {
        to: String,
        amount: String,
        tx_hash: TxHash,
    },
    /// A transfer attempt finished and was recorded
    TransferRecorded { record: TransferRecord },
    /// A transfer was refused before reaching the provider
    TransferRejected { error: TransferError },
    /// The network changed; session and history were dropped
    EnvironmentReset,
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Create a bridge whose worker builds an RPC wallet for `endpoint`.
    pub fn new(endpoint: ProviderConfig, options: WalletOptions) -> anyhow::Result<Self> {
        Self::spawn(ProviderSource::Connect { endpoint, options })
    }

    /// Create a bridge around an existing provider (or none at all).
    pub fn with_provider(provider: Option<Arc<dyn WalletProvider>>) -> anyhow::Result<Self> {
        Self::spawn(ProviderSource::Ready(provider))
    }

    fn spawn(source: ProviderSource) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        // Spawn the worker thread with its own Tokio runtime
        thread::Builder::new()
            .name("trachy-runtime".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) = run_async_worker(source, cmd_rx, evt_tx.clone()).await {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Block for the next event, up to `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RuntimeEvent> {
        match self.evt_rx.recv_timeout(timeout) {
            Ok(evt) => Some(evt),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
