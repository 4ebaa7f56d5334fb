mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{tokens, MockWallet, BOB, BOB_STR};
use trachy::infrastructure::ethereum::{ProviderEvent, WalletProvider};
use trachy::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use trachy::session::{ConnectError, TransferError};
use trachy::store::Store;

const WAIT: Duration = Duration::from_secs(5);

fn bridge(mock: &Arc<MockWallet>) -> RuntimeBridge {
    RuntimeBridge::with_provider(Some(mock.clone() as Arc<dyn WalletProvider>)).unwrap()
}

/// Collect events until one matches `done` or the wait runs out.
fn collect_until(
    bridge: &RuntimeBridge,
    done: impl Fn(&RuntimeEvent) -> bool,
) -> Vec<RuntimeEvent> {
    let deadline = Instant::now() + WAIT;
    let mut events = Vec::new();
    while Instant::now() < deadline {
        if let Some(event) = bridge.recv_timeout(Duration::from_millis(100)) {
            let finished = done(&event);
            events.push(event);
            if finished {
                break;
            }
        }
    }
    events
}

fn wait_for_subscriber(mock: &MockWallet) {
    let deadline = Instant::now() + WAIT;
    while !mock.has_subscriber() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_connect_emits_connecting_then_connected() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);

    bridge.send(RuntimeCommand::Connect).unwrap();
    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. }));

    assert!(matches!(events.first(), Some(RuntimeEvent::Connecting)));
    match events.last() {
        Some(RuntimeEvent::Connected { session }) => assert_eq!(session.balance(), tokens(1000)),
        other => panic!("expected Connected, got {other:?}"),
    }
}

#[test]
fn test_no_provider_reports_connect_failure() {
    let bridge = RuntimeBridge::with_provider(None).unwrap();

    bridge.send(RuntimeCommand::Connect).unwrap();
    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::ConnectFailed { .. }));

    assert!(matches!(
        events.last(),
        Some(RuntimeEvent::ConnectFailed {
            error: ConnectError::NoProvider
        })
    ));
}

#[test]
fn test_transfer_flow_updates_store() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);
    let mut store = Store::new();

    bridge.send(RuntimeCommand::Connect).unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. })) {
        store.dispatch(&event);
    }
    assert!(store.state().is_connected());

    assert!(store.begin_transfer());
    bridge
        .send(RuntimeCommand::Transfer {
            to: BOB_STR.to_string(),
            amount: "5.0".to_string(),
        })
        .unwrap();
    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::SessionUpdated { .. }));

    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::TransferSubmitted { .. })));
    for event in &events {
        store.dispatch(event);
    }

    let state = store.state();
    assert!(!state.transfer_pending);
    assert_eq!(state.history.len(), 1);
    assert!(state.history.latest().unwrap().is_success());
    assert_eq!(state.session.as_ref().unwrap().balance(), tokens(995));
}

#[test]
fn test_transfer_before_connect_is_rejected() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);

    bridge
        .send(RuntimeCommand::Transfer {
            to: BOB_STR.to_string(),
            amount: "1".to_string(),
        })
        .unwrap();
    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::TransferRejected { .. }));

    assert!(matches!(
        events.last(),
        Some(RuntimeEvent::TransferRejected {
            error: TransferError::NotConnected
        })
    ));
    assert!(mock.sent().is_empty());
}

#[test]
fn test_malformed_transfer_is_recorded() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);
    let mut store = Store::new();

    bridge.send(RuntimeCommand::Connect).unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. })) {
        store.dispatch(&event);
    }

    assert!(store.begin_transfer());
    bridge
        .send(RuntimeCommand::Transfer {
            to: "0x1234".to_string(),
            amount: "1".to_string(),
        })
        .unwrap();
    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::TransferRecorded { .. }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::TransferSubmitted { .. })));
    for event in &events {
        store.dispatch(event);
    }

    let state = store.state();
    assert!(!state.transfer_pending);
    assert_eq!(state.history.len(), 1);
    assert!(!state.history.latest().unwrap().is_success());
    assert!(mock.sent().is_empty());
}

#[test]
fn test_account_change_reconnects_and_keeps_history() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);
    let mut store = Store::new();

    bridge.send(RuntimeCommand::Connect).unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. })) {
        store.dispatch(&event);
    }
    bridge
        .send(RuntimeCommand::Transfer {
            to: BOB_STR.to_string(),
            amount: "1".to_string(),
        })
        .unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::SessionUpdated { .. })) {
        store.dispatch(&event);
    }
    assert_eq!(store.state().history.len(), 1);

    wait_for_subscriber(&mock);
    mock.set_balance(BOB, tokens(7));
    mock.set_accounts(vec![BOB]);
    assert!(mock.emit(ProviderEvent::AccountsChanged(vec![BOB])));

    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::EnvironmentReset)));
    let connecting = events
        .iter()
        .position(|e| matches!(e, RuntimeEvent::Connecting))
        .expect("Connecting before reconnect");
    match events.last() {
        Some(RuntimeEvent::Connected { session }) => {
            assert_eq!(session.account(), BOB);
            assert_eq!(session.balance(), tokens(7));
        }
        other => panic!("expected Connected, got {other:?}"),
    }
    assert!(connecting < events.len() - 1);
    for event in &events {
        store.dispatch(event);
    }

    let state = store.state();
    assert_eq!(state.session.as_ref().unwrap().account(), BOB);
    assert_eq!(state.history.len(), 1);
}

#[test]
fn test_network_change_resets_environment() {
    let mock = Arc::new(MockWallet::dev());
    let bridge = bridge(&mock);
    let mut store = Store::new();

    bridge.send(RuntimeCommand::Connect).unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::Connected { .. })) {
        store.dispatch(&event);
    }
    bridge
        .send(RuntimeCommand::Transfer {
            to: BOB_STR.to_string(),
            amount: "1".to_string(),
        })
        .unwrap();
    for event in collect_until(&bridge, |e| matches!(e, RuntimeEvent::SessionUpdated { .. })) {
        store.dispatch(&event);
    }
    assert_eq!(store.state().history.len(), 1);

    wait_for_subscriber(&mock);
    mock.set_chain_id(1);
    assert!(mock.emit(ProviderEvent::ChainChanged(1)));

    let events = collect_until(&bridge, |e| matches!(e, RuntimeEvent::ConnectFailed { .. }));
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::EnvironmentReset)));
    for event in &events {
        store.dispatch(event);
    }

    let state = store.state();
    assert!(state.history.is_empty());
    assert!(state.session.is_none());
}
