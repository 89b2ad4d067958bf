//! Wallet connectivity port
//!
//! The dashboard never holds keys; it asks an injected provider (a browser
//! extension bridge in production, [`MockWallet`] in tests) for accounts and
//! transaction signatures.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("no accounts exposed by wallet")]
    NoAccounts,

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

pub type WalletResult<T> = Result<T, WalletError>;

/// Port to an external wallet. Addresses are hex strings; values are wei.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for its accounts, prompting the user if needed.
    async fn request_accounts(&self) -> WalletResult<Vec<String>>;

    /// Submit a value transfer and return the transaction hash.
    async fn send_transaction(&self, from: &str, to: &str, value_wei: u128)
        -> WalletResult<String>;
}

/// Immutable snapshot of a wallet connection.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSession {
    account: Option<String>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self { account: None }
    }

    /// Connect via the provider; the first exposed account becomes the
    /// session account, lowercased so storage lookups stay consistent.
    pub async fn connect<P: WalletProvider>(provider: &P) -> WalletResult<Self> {
        let accounts = provider.request_accounts().await?;
        let account = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        Ok(Self {
            account: Some(account.to_lowercase()),
        })
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Convert a BNB amount to wei. Returns None on negative amounts or
/// amounts too large for u128.
pub fn to_wei(amount: Decimal) -> Option<u128> {
    if amount.is_sign_negative() {
        return None;
    }
    let wei = amount.checked_mul(Decimal::from(1_000_000_000_000_000_000u64))?;
    wei.trunc().to_u128()
}

/// In-memory wallet for tests: canned accounts and a failure switch.
pub struct MockWallet {
    accounts: Vec<String>,
    fail_sends: Mutex<bool>,
    sent: Mutex<Vec<(String, String, u128)>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        Self {
            accounts,
            fail_sends: Mutex::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().expect("mock wallet lock poisoned") = fail;
    }

    pub fn sent_transactions(&self) -> Vec<(String, String, u128)> {
        self.sent.lock().expect("mock wallet lock poisoned").clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> WalletResult<Vec<String>> {
        Ok(self.accounts.clone())
    }

    async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        value_wei: u128,
    ) -> WalletResult<String> {
        if *self.fail_sends.lock().expect("mock wallet lock poisoned") {
            return Err(WalletError::Rejected("user denied signature".to_string()));
        }
        let mut sent = self.sent.lock().expect("mock wallet lock poisoned");
        sent.push((from.to_string(), to.to_string(), value_wei));
        Ok(format!("0xmock{:04x}", sent.len()))
    }
}
