//! Boundary to the injected browser wallet (EIP-1193 provider object).
//!
//! The browser glue implements [`HostProvider`] over `window.ethereum`; tests
//! implement it in memory. Payloads stay as [`serde_json::Value`] so the
//! adapter owns all interpretation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ProviderRpcError;

/// Event carrying the new ordered list of authorized accounts.
pub const ACCOUNTS_CHANGED: &str = "accountsChanged";

/// Callback invoked with an event's payload.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Shared host provider handle.
pub type SharedHostProvider = Arc<dyn HostProvider>;

/// JSON-RPC style host provider.
///
/// A request that never resolves suspends the awaiting flow indefinitely;
/// callers that need a bound impose their own timeout.
#[async_trait]
pub trait HostProvider: Send + Sync + fmt::Debug {
    /// Issue a `{ method, params }` request.
    ///
    /// # Errors
    ///
    /// Returns the provider's error object when the request is rejected.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    /// Register `handler` for `event`.
    fn on(&self, event: &str, handler: EventHandler);

    /// Remove every handler registered for `event`.
    fn remove_all_listeners(&self, event: &str);
}

/// JSON-RPC method names used by the injected adapter.
pub(crate) mod methods {
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}
