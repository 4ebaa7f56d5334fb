//! Scripted wallet provider shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use tokio::sync::mpsc;

use trachy::domain::token::ITrachyCoin;
use trachy::domain::{DEPLOYER_ADDRESS, EXPECTED_CHAIN_ID};
use trachy::infrastructure::ethereum::{
    Confirmation, ProviderError, ProviderEvent, WalletProvider,
};

/// Hardhat account #1
pub const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
pub const BOB_STR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptScript {
    Success,
    Reverted,
    Error,
}

/// A wallet on a local dev chain, controlled by the test.
pub struct MockWallet {
    accounts: Mutex<Vec<Address>>,
    reject_accounts: Mutex<bool>,
    chain_id: Mutex<u64>,
    code: Mutex<Bytes>,
    balances: Mutex<HashMap<Address, U256>>,
    send_error: Mutex<Option<ProviderError>>,
    receipt: Mutex<ReceiptScript>,
    sent: Mutex<Vec<(Address, Address, U256)>>,
    subscriber: Mutex<Option<mpsc::Sender<ProviderEvent>>>,
    calls: AtomicUsize,
    nonce: AtomicUsize,
}

impl MockWallet {
    /// Deployer account holding 1000 TRCHY on chain 31337 with the token deployed.
    pub fn dev() -> Self {
        let mut balances = HashMap::new();
        balances.insert(DEPLOYER_ADDRESS, tokens(1000));
        Self {
            accounts: Mutex::new(vec![DEPLOYER_ADDRESS]),
            reject_accounts: Mutex::new(false),
            chain_id: Mutex::new(EXPECTED_CHAIN_ID),
            code: Mutex::new(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])),
            balances: Mutex::new(balances),
            send_error: Mutex::new(None),
            receipt: Mutex::new(ReceiptScript::Success),
            sent: Mutex::new(Vec::new()),
            subscriber: Mutex::new(None),
            calls: AtomicUsize::new(0),
            nonce: AtomicUsize::new(1),
        }
    }

    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts;
    }

    pub fn reject_accounts(&self) {
        *self.reject_accounts.lock().unwrap() = true;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    pub fn remove_code(&self) {
        *self.code.lock().unwrap() = Bytes::new();
    }

    pub fn set_balance(&self, owner: Address, balance: U256) {
        self.balances.lock().unwrap().insert(owner, balance);
    }

    pub fn balance(&self, owner: Address) -> U256 {
        self.balances
            .lock()
            .unwrap()
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn fail_send(&self, error: ProviderError) {
        *self.send_error.lock().unwrap() = Some(error);
    }

    pub fn script_receipt(&self, script: ReceiptScript) {
        *self.receipt.lock().unwrap() = script;
    }

    /// Transfers that reached `send_transaction`: (from, to, raw amount).
    pub fn sent(&self) -> Vec<(Address, Address, U256)> {
        self.sent.lock().unwrap().clone()
    }

    /// Total number of provider calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.lock().unwrap().is_some()
    }

    /// Push a wallet notification to the subscriber, if any.
    pub fn emit(&self, event: ProviderEvent) -> bool {
        match self.subscriber.lock().unwrap().as_ref() {
            Some(tx) => tx.try_send(event).is_ok(),
            None => false,
        }
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.touch();
        if *self.reject_accounts.lock().unwrap() {
            return Err(ProviderError::Rejected("User rejected the request.".into()));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.touch();
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn get_code(&self, _address: Address) -> Result<Bytes, ProviderError> {
        self.touch();
        Ok(self.code.lock().unwrap().clone())
    }

    async fn signer_address(&self) -> Result<Address, ProviderError> {
        self.touch();
        self.accounts
            .lock()
            .unwrap()
            .first()
            .copied()
            .ok_or_else(|| ProviderError::Rejected("no accounts".into()))
    }

    async fn call(&self, _to: Address, input: Bytes) -> Result<Bytes, ProviderError> {
        self.touch();
        if input.len() >= 4 && input[..4] == ITrachyCoin::balanceOfCall::SELECTOR {
            let call = ITrachyCoin::balanceOfCall::abi_decode(&input)
                .map_err(|e| ProviderError::Decode(e.to_string()))?;
            let balance = self.balance(call.owner);
            return Ok(Bytes::from(balance.to_be_bytes::<32>().to_vec()));
        }
        // Metadata reads fall back to defaults.
        Err(ProviderError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
        })
    }

    async fn send_transaction(
        &self,
        from: Address,
        _to: Address,
        input: Bytes,
    ) -> Result<TxHash, ProviderError> {
        self.touch();
        if let Some(err) = self.send_error.lock().unwrap().clone() {
            return Err(err);
        }
        let call = ITrachyCoin::transferCall::abi_decode(&input)
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        self.sent.lock().unwrap().push((from, call.to, call.amount));

        if *self.receipt.lock().unwrap() == ReceiptScript::Success {
            let mut balances = self.balances.lock().unwrap();
            let from_balance = balances.get(&from).copied().unwrap_or_default();
            balances.insert(from, from_balance.saturating_sub(call.amount));
            let to_balance = balances.get(&call.to).copied().unwrap_or_default();
            balances.insert(call.to, to_balance + call.amount);
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst) as u64;
        Ok(TxHash::from(U256::from(nonce).to_be_bytes::<32>()))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Confirmation, ProviderError> {
        self.touch();
        match *self.receipt.lock().unwrap() {
            ReceiptScript::Success => Ok(Confirmation {
                tx_hash,
                block_number: Some(2),
                success: true,
            }),
            ReceiptScript::Reverted => Ok(Confirmation {
                tx_hash,
                block_number: Some(2),
                success: false,
            }),
            ReceiptScript::Error => Err(ProviderError::Transport("connection reset".into())),
        }
    }

    async fn subscribe(&self) -> Result<mpsc::Receiver<ProviderEvent>, ProviderError> {
        let (tx, rx) = mpsc::channel(16);
        *self.subscriber.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn endpoint_name(&self) -> String {
        "mock://dev".to_string()
    }
}
