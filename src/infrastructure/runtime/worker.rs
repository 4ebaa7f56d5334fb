//! Async worker - runs in Tokio runtime and owns the session client

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::error::TryRecvError as NotifyRecvError;

use crate::domain::Session;
use crate::infrastructure::ethereum::{
    connect_wallet, ProviderConfig, ProviderEvent, WalletOptions, WalletProvider,
};
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};
use crate::session::{ConnectError, SessionClient};

/// Where the worker gets its wallet provider from
pub enum ProviderSource {
    /// Build an RPC wallet on startup
    Connect {
        endpoint: ProviderConfig,
        options: WalletOptions,
    },
    /// Use the given provider as is
    Ready(Option<Arc<dyn WalletProvider>>),
}

/// Run the async worker loop
///
/// Commands and provider notifications are handled strictly one at a time,
/// so a second connect or transfer waits for the first to finish.
pub async fn run_async_worker(
    source: ProviderSource,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let provider = match source {
        ProviderSource::Ready(provider) => provider,
        ProviderSource::Connect { endpoint, options } => {
            match connect_wallet(&endpoint, &options).await {
                Ok(wallet) => Some(Arc::new(wallet) as Arc<dyn WalletProvider>),
                Err(err) => {
                    // Keep running; every connect will report the missing provider.
                    tracing::error!(endpoint = %endpoint.display(), error = %err, "Wallet provider unavailable");
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Wallet provider unavailable ({}): {}", endpoint.display(), err),
                    });
                    None
                }
            }
        }
    };

    let mut client = SessionClient::new(provider);
    let mut notifications: Option<tokio::sync::mpsc::Receiver<ProviderEvent>> = None;

    loop {
        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };
            tracing::debug!(command = ?cmd, "Worker command");

            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::Connect => {
                    connect(&mut client, &evt_tx).await;
                    if notifications.is_none() && client.has_provider() {
                        notifications = client.subscribe().await;
                    }
                }

                RuntimeCommand::Transfer { to, amount } => {
                    transfer(&mut client, &evt_tx, to, amount).await;
                }

                RuntimeCommand::RefreshBalance => match client.refresh_balance().await {
                    Ok(session) => {
                        let _ = evt_tx.send(RuntimeEvent::SessionUpdated { session });
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Balance refresh failed: {}", err),
                        });
                    }
                },
            }
        }

        // Drain provider notifications
        let mut pending = Vec::new();
        let mut closed = false;
        if let Some(rx) = notifications.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(event) => pending.push(event),
                    Err(NotifyRecvError::Empty) => break,
                    Err(NotifyRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }
        if closed {
            tracing::debug!("Provider notification stream closed");
            notifications = None;
        }

        for event in pending {
            match event {
                ProviderEvent::AccountsChanged(accounts) => {
                    tracing::info!(count = accounts.len(), "Wallet accounts changed");
                    let _ = evt_tx.send(RuntimeEvent::Connecting);
                    report_connect(client.on_external_account_change().await, &evt_tx);
                }
                ProviderEvent::ChainChanged(chain_id) => {
                    tracing::info!(chain_id, "Wallet network changed");
                    let _ = evt_tx.send(RuntimeEvent::EnvironmentReset);
                    let _ = evt_tx.send(RuntimeEvent::Connecting);
                    report_connect(client.on_external_network_change().await, &evt_tx);
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn connect(client: &mut SessionClient, evt_tx: &Sender<RuntimeEvent>) {
    let _ = evt_tx.send(RuntimeEvent::Connecting);
    report_connect(client.connect().await, evt_tx);
}

fn report_connect(result: Result<Arc<Session>, ConnectError>, evt_tx: &Sender<RuntimeEvent>) {
    let event = match result {
        Ok(session) => RuntimeEvent::Connected { session },
        Err(error) => RuntimeEvent::ConnectFailed { error },
    };
    let _ = evt_tx.send(event);
}

async fn transfer(
    client: &mut SessionClient,
    evt_tx: &Sender<RuntimeEvent>,
    to: String,
    amount: String,
) {
    let submitted_tx = evt_tx.clone();
    let (sub_to, sub_amount) = (to.clone(), amount.clone());
    let result = client
        .transfer_with(&to, &amount, move |tx_hash| {
            let _ = submitted_tx.send(RuntimeEvent::TransferSubmitted {
                to: sub_to,
                amount: sub_amount,
                tx_hash,
            });
        })
        .await;

    match result {
        Ok(record) => {
            let succeeded = record.is_success();
            let _ = evt_tx.send(RuntimeEvent::TransferRecorded { record });
            if succeeded {
                if let Some(session) = client.session() {
                    let _ = evt_tx.send(RuntimeEvent::SessionUpdated { session });
                }
            }
        }
        Err(error) => {
            tracing::warn!(error = %error, "Transfer refused");
            let _ = evt_tx.send(RuntimeEvent::TransferRejected { error });
        }
    }
}
