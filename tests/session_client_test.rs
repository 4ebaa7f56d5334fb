mod common;

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use chrono::Utc;

use common::{tokens, MockWallet, ReceiptScript, BOB, BOB_STR};
use trachy::domain::{TransferFailure, TransferStatus, DEPLOYER_ADDRESS, TRACHYCOIN_ADDRESS};
use trachy::infrastructure::ethereum::{ProviderError, WalletProvider};
use trachy::session::{ConnectError, SessionClient, SessionStatus, TransferError};

fn client_for(mock: &Arc<MockWallet>) -> SessionClient {
    SessionClient::new(Some(mock.clone() as Arc<dyn WalletProvider>))
}

async fn connected(mock: &Arc<MockWallet>) -> SessionClient {
    let mut client = client_for(mock);
    client.connect().await.expect("connect");
    client
}

#[tokio::test]
async fn test_connect_builds_session() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = client_for(&mock);

    let session = client.connect().await.unwrap();
    assert_eq!(client.status(), &SessionStatus::Connected);
    assert_eq!(session.account(), DEPLOYER_ADDRESS);
    assert_eq!(session.chain_id(), 31337);
    assert!(session.is_contract_deployed());
    assert_eq!(session.contract().map(|c| c.address), Some(TRACHYCOIN_ADDRESS));
    assert_eq!(session.balance(), tokens(1000));
    assert_eq!(session.display_balance(), "1000.0");
    assert_eq!(session.metadata().symbol, "TRCHY");
    assert_eq!(session.endpoint(), "mock://dev");
}

#[tokio::test]
async fn test_wrong_network_never_sets_contract() {
    let mock = Arc::new(MockWallet::dev());
    mock.set_chain_id(1);
    let mut client = client_for(&mock);

    let err = client.connect().await.unwrap_err();
    assert_eq!(
        err,
        ConnectError::WrongNetwork {
            expected: 31337,
            actual: 1
        }
    );
    assert!(client.session().is_none());
    assert!(matches!(client.status(), SessionStatus::Failed(_)));
}

#[tokio::test]
async fn test_missing_bytecode_is_not_deployed() {
    let mock = Arc::new(MockWallet::dev());
    mock.remove_code();
    let mut client = client_for(&mock);

    let err = client.connect().await.unwrap_err();
    assert_eq!(
        err,
        ConnectError::NotDeployed {
            address: TRACHYCOIN_ADDRESS
        }
    );
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_rejected_authorization() {
    let mock = Arc::new(MockWallet::dev());
    mock.reject_accounts();
    let mut client = client_for(&mock);

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ConnectError::Rejected { .. }));
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_failed_reconnect_drops_previous_session() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    assert!(client.session().is_some());

    mock.set_chain_id(5);
    assert!(client.connect().await.is_err());
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_successful_transfer_records_once_and_refreshes_balance() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    let before = client.session().unwrap();
    let started = Utc::now();

    let record = client.transfer(BOB_STR, "5.0").await.unwrap();

    assert_eq!(record.status, TransferStatus::Success);
    assert_eq!(record.from, DEPLOYER_ADDRESS);
    assert_eq!(record.to, BOB);
    assert_eq!(record.amount, "5.0");
    assert_eq!(record.raw_amount, tokens(5));
    assert!(record.tx_hash.is_some());
    assert!(record.timestamp >= started);

    assert_eq!(client.history().len(), 1);
    assert_eq!(client.history().latest(), Some(&record));

    let after = client.session().unwrap();
    assert_eq!(after.balance(), tokens(995));
    // The old session value is untouched.
    assert_eq!(before.balance(), tokens(1000));
}

#[tokio::test]
async fn test_amount_is_scaled_by_decimals() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;

    client.transfer(BOB_STR, "5.0").await.unwrap();
    client.transfer(BOB_STR, "0.25").await.unwrap();

    let sent = mock.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], (DEPLOYER_ADDRESS, BOB, tokens(5)));
    assert_eq!(sent[1].2, tokens(1) / U256::from(4u64));
}

#[tokio::test]
async fn test_submission_failure_is_recorded() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    mock.fail_send(ProviderError::Rejected("User denied transaction signature.".into()));

    let record = client.transfer(BOB_STR, "1").await.unwrap();

    assert_eq!(record.status, TransferStatus::Failed);
    assert!(record.tx_hash.is_none());
    assert!(matches!(record.failure, Some(TransferFailure::Submission(_))));
    assert_eq!(client.history().len(), 1);
    assert_eq!(client.session().unwrap().balance(), tokens(1000));
}

#[tokio::test]
async fn test_reverted_transfer_is_recorded() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    mock.script_receipt(ReceiptScript::Reverted);

    let record = client.transfer(BOB_STR, "1").await.unwrap();

    assert_eq!(record.status, TransferStatus::Failed);
    assert!(record.tx_hash.is_some());
    assert!(matches!(record.failure, Some(TransferFailure::Confirmation(_))));
    assert_eq!(client.history().len(), 1);
    assert_eq!(client.session().unwrap().balance(), tokens(1000));
}

#[tokio::test]
async fn test_receipt_error_is_recorded() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    mock.script_receipt(ReceiptScript::Error);

    let record = client.transfer(BOB_STR, "2").await.unwrap();
    assert!(!record.is_success());
    assert!(matches!(record.failure, Some(TransferFailure::Confirmation(_))));
    assert_eq!(client.history().len(), 1);
}

#[tokio::test]
async fn test_blank_fields_are_refused_without_record() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    let calls = mock.calls();

    for (to, amount) in [("", "1"), (BOB_STR, ""), ("  ", " ")] {
        let err = client.transfer(to, amount).await.unwrap_err();
        assert!(matches!(err, TransferError::InvalidInput { .. }), "{to:?} {amount:?}");
    }

    assert_eq!(mock.calls(), calls);
    assert!(client.history().is_empty());
}

#[tokio::test]
async fn test_malformed_input_is_recorded_without_provider_call() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    let calls = mock.calls();

    let record = client.transfer("0x1234", "1").await.unwrap();
    assert_eq!(record.status, TransferStatus::Failed);
    assert_eq!(record.to, Address::ZERO);
    assert_eq!(record.amount, "1");
    assert!(record.tx_hash.is_none());
    match &record.failure {
        Some(TransferFailure::Submission(reason)) => {
            assert!(reason.contains("invalid recipient address"))
        }
        other => panic!("expected submission failure, got {other:?}"),
    }
    assert_eq!(client.history().len(), 1);

    let record = client.transfer(BOB_STR, "abc").await.unwrap();
    assert_eq!(record.to, BOB);
    assert_eq!(record.raw_amount, U256::ZERO);
    assert!(matches!(
        &record.failure,
        Some(TransferFailure::Submission(reason)) if reason.contains("invalid amount")
    ));
    assert_eq!(client.history().len(), 2);
    assert_eq!(client.history().latest(), Some(&record));

    assert_eq!(mock.calls(), calls);
    assert!(mock.sent().is_empty());
    assert_eq!(client.session().unwrap().balance(), tokens(1000));
}

#[tokio::test]
async fn test_malformed_input_without_session_is_not_connected() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = client_for(&mock);

    let err = client.transfer("0x1234", "abc").await.unwrap_err();
    assert_eq!(err, TransferError::NotConnected);
    assert!(client.history().is_empty());
}

#[tokio::test]
async fn test_transfer_requires_session() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = client_for(&mock);

    let err = client.transfer(BOB_STR, "1").await.unwrap_err();
    assert_eq!(err, TransferError::NotConnected);
    assert_eq!(mock.calls(), 0);
    assert!(client.history().is_empty());
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;

    client.transfer(BOB_STR, "1").await.unwrap();
    client.transfer(BOB_STR, "2").await.unwrap();

    let amounts: Vec<_> = client.history().iter().map(|r| r.amount.clone()).collect();
    assert_eq!(amounts, vec!["2".to_string(), "1".to_string()]);
}

#[tokio::test]
async fn test_refresh_balance_replaces_session() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    let before = client.session().unwrap();

    mock.set_balance(DEPLOYER_ADDRESS, tokens(42));
    let after = client.refresh_balance().await.unwrap();

    assert_eq!(after.balance(), tokens(42));
    assert_eq!(before.balance(), tokens(1000));
    assert_eq!(client.session().unwrap().balance(), tokens(42));
}

#[tokio::test]
async fn test_account_change_reconnects() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    mock.set_balance(BOB, tokens(7));
    mock.set_accounts(vec![BOB]);

    let session = client.on_external_account_change().await.unwrap();
    assert_eq!(session.account(), BOB);
    assert_eq!(session.balance(), tokens(7));
    assert_eq!(client.session().unwrap().account(), BOB);
}

#[tokio::test]
async fn test_network_change_clears_history() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    client.transfer(BOB_STR, "1").await.unwrap();
    assert_eq!(client.history().len(), 1);

    let session = client.on_external_network_change().await.unwrap();
    assert!(client.history().is_empty());
    assert_eq!(session.chain_id(), 31337);
}

#[tokio::test]
async fn test_network_change_to_wrong_chain() {
    let mock = Arc::new(MockWallet::dev());
    let mut client = connected(&mock).await;
    client.transfer(BOB_STR, "1").await.unwrap();

    mock.set_chain_id(1);
    let err = client.on_external_network_change().await.unwrap_err();
    assert!(matches!(err, ConnectError::WrongNetwork { actual: 1, .. }));
    assert!(client.session().is_none());
    assert!(client.history().is_empty());
}
