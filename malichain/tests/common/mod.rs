//! In-memory host provider and ledger session for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use malichain::prelude::*;
use serde_json::{Value, json};
use tokio::sync::Notify;

// The prelude's one-parameter alias would shadow it.
type StdResult<T, E> = std::result::Result<T, E>;

pub const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000b0b";
pub const TX_HASH: &str = "0x8e3a4bd5a3c04d4c1b2b1a6e0f0c6c9b6e2a5f3d1c0b9a8f7e6d5c4b3a291807";

/// Host provider with scripted responses per method.
///
/// Scripted responses are consumed in order; once a method's queue is empty
/// its fallback (if any) is returned. Unscripted methods answer `null`.
#[derive(Default)]
pub struct MockHost {
    scripted: Mutex<HashMap<String, VecDeque<StdResult<Value, ProviderRpcError>>>>,
    fallback: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<(String, Value)>>,
    listeners: Mutex<HashMap<String, Vec<EventHandler>>>,
}

impl fmt::Debug for MockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners: Vec<String> = self
            .listeners
            .lock()
            .map(|l| l.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MockHost")
            .field("calls", &self.calls.lock().map(|c| c.len()).unwrap_or(0))
            .field("listeners", &listeners)
            .finish_non_exhaustive()
    }
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Host that accepts the chain switch and authorizes `accounts`.
    pub fn with_accounts(accounts: &[&str]) -> Arc<Self> {
        let host = Self::new();
        host.set_fallback("eth_requestAccounts", json!(accounts));
        host.set_fallback("eth_accounts", json!(accounts));
        host
    }

    pub fn push(&self, method: &str, response: StdResult<Value, ProviderRpcError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(method.to_owned())
            .or_default()
            .push_back(response);
    }

    pub fn push_error(&self, method: &str, code: i64, message: &str) {
        self.push(method, Err(ProviderRpcError::new(code, message)));
    }

    pub fn set_fallback(&self, method: &str, value: Value) {
        self.fallback
            .lock()
            .unwrap()
            .insert(method.to_owned(), value);
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p)
            .collect()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Deliver `payload` to every handler of `event`.
    pub fn emit(&self, event: &str, payload: &Value) {
        let handlers = self
            .listeners
            .lock()
            .unwrap()
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            handler(payload);
        }
    }
}

#[async_trait]
impl HostProvider for MockHost {
    async fn request(&self, method: &str, params: Value) -> StdResult<Value, ProviderRpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_owned(), params));
        let next = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        if let Some(response) = next {
            return response;
        }
        Ok(self
            .fallback
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.listeners
            .lock()
            .unwrap()
            .entry(event.to_owned())
            .or_default()
            .push(handler);
    }

    fn remove_all_listeners(&self, event: &str) {
        self.listeners.lock().unwrap().remove(event);
    }
}

/// Ledger session with a fixed pairing and scripted execution results.
#[derive(Debug, Default)]
pub struct MockSession {
    pub accounts: Vec<AccountId>,
    pub pair_error: Option<WalletError>,
    pub execute_error: Mutex<Option<WalletError>>,
    pub disconnect_error: Option<WalletError>,
    pub executed: Mutex<Vec<LedgerTransaction>>,
    /// When set, `pair` waits for a permit before answering.
    pub pair_gate: Option<Arc<Notify>>,
    pub disconnect_calls: Mutex<usize>,
}

impl MockSession {
    pub fn paired(accounts: &[AccountId]) -> Self {
        Self {
            accounts: accounts.to_vec(),
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<LedgerTransaction> {
        self.executed.lock().unwrap().clone()
    }

    pub fn disconnects(&self) -> usize {
        *self.disconnect_calls.lock().unwrap()
    }
}

#[async_trait]
impl LedgerSession for MockSession {
    async fn pair(&self) -> StdResult<Vec<AccountId>, WalletError> {
        if let Some(gate) = &self.pair_gate {
            gate.notified().await;
        }
        match &self.pair_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.accounts.clone()),
        }
    }

    async fn execute(&self, transaction: LedgerTransaction) -> StdResult<String, WalletError> {
        if let Some(e) = self.execute_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut executed = self.executed.lock().unwrap();
        executed.push(transaction);
        Ok(format!("0.0.1001@1700000000.{:09}", executed.len()))
    }

    async fn disconnect(&self) -> StdResult<(), WalletError> {
        *self.disconnect_calls.lock().unwrap() += 1;
        match &self.disconnect_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// EIP-55 form of `address`, as the adapter reports accounts.
pub fn checksummed(address: &str) -> String {
    address
        .parse::<alloy::primitives::Address>()
        .unwrap()
        .to_checksum(None)
}

/// Configuration with a short receipt poll interval.
pub fn test_config() -> AppConfig {
    AppConfig {
        confirmation_poll_interval_ms: 1,
        ..AppConfig::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("malichain=debug")
        .with_test_writer()
        .try_init();
}
