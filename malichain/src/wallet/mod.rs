//! Wallet interface contract and provider adapters.
//!
//! Every supported wallet kind is a variant struct implementing
//! [`WalletInterface`]; [`WalletAdapter`] is the tagged union the connection
//! controller dispatches through.
//!
//! # Architecture
//!
//! ```text
//! WalletAdapter::Injected(InjectedWallet) → HostProvider (EIP-1193) → JSON-RPC relay
//! WalletAdapter::Native(NativeWallet)     → LedgerSession (pairing)  → ledger nodes
//! ```
//!
//! # Failure model
//!
//! Operations never return an error to the UI. Each transfer resolves to a
//! [`TransactionOutcome`]; diagnostics go to `tracing`. `connect` is the one
//! exception: a missing extension is returned as
//! [`WalletError::ProviderMissing`] so the UI can show a blocking notice.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::{AccountId, TokenId};

mod error;
pub mod host;
pub mod injected;
pub mod native;
mod params;

pub use error::{HostErrorKind, ProviderRpcError, WalletError};
pub use host::{ACCOUNTS_CHANGED, EventHandler, HostProvider, SharedHostProvider};
pub use injected::{AccountSubscription, InjectedWallet};
pub use native::{LedgerSession, LedgerTransaction, NativeWallet};
pub use params::{CallParameter, ContractFunctionParameterBuilder};

/// Supported wallet kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// Browser extension exposing an injected EIP-1193 provider.
    Injected,
    /// Native ledger wallet reached through a pairing session.
    Native,
}

impl AdapterKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Injected => "injected",
            Self::Native => "native",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a submission attempt.
///
/// `NotSubmitted` means "not submitted or not confirmed", not "failed
/// irreversibly": the network may still finalize a transaction whose
/// confirmation was lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionOutcome {
    /// The transaction was accepted; carries its hash or id.
    Submitted(String),
    /// No outcome is known.
    NotSubmitted,
}

impl TransactionOutcome {
    /// The transaction hash, if submitted.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        match self {
            Self::Submitted(hash) => Some(hash),
            Self::NotSubmitted => None,
        }
    }

    /// Whether a hash is available.
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// Convert into an `Option` of the hash.
    #[must_use]
    pub fn into_hash(self) -> Option<String> {
        match self {
            Self::Submitted(hash) => Some(hash),
            Self::NotSubmitted => None,
        }
    }
}

impl From<Option<String>> for TransactionOutcome {
    fn from(hash: Option<String>) -> Self {
        hash.map_or(Self::NotSubmitted, Self::Submitted)
    }
}

/// What `disconnect` achieved beyond clearing the adapter's own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectNotice {
    /// The underlying session was terminated.
    SessionTerminated,
    /// The host keeps its authorization; the user must revoke it out of band.
    ManualActionRequired(String),
}

impl DisconnectNotice {
    /// Message to show the user, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::SessionTerminated => None,
            Self::ManualActionRequired(msg) => Some(msg),
        }
    }
}

/// Uniform capability set every adapter provides to the UI.
#[async_trait]
pub trait WalletInterface: Send + Sync + fmt::Debug {
    /// Which kind of wallet this adapter drives.
    fn kind(&self) -> AdapterKind;

    /// Run the adapter's connect flow and return the adopted account.
    ///
    /// `Ok(None)` means the attempt finished without an account (declined,
    /// aborted or nothing authorized).
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::ProviderMissing`] when the wallet is not
    /// available in this environment.
    async fn connect(&self) -> Result<Option<String>, WalletError>;

    /// Send `amount` (a decimal string in whole units) of the native currency.
    async fn transfer_native_currency(&self, to: &AccountId, amount: &str) -> TransactionOutcome;

    /// Send `amount` base units of a fungible token.
    async fn transfer_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        amount: u64,
    ) -> TransactionOutcome;

    /// Send one serial of a non-fungible token.
    async fn transfer_non_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        serial_number: u64,
    ) -> TransactionOutcome;

    /// Opt the connected account into holding `token`.
    async fn associate_token(&self, token: &TokenId) -> TransactionOutcome;

    /// Forget the connection.
    async fn disconnect(&self) -> DisconnectNotice;
}

/// Tagged union of the supported adapters.
#[derive(Debug, Clone)]
pub enum WalletAdapter {
    /// Injected provider adapter.
    Injected(InjectedWallet),
    /// Native pairing adapter.
    Native(NativeWallet),
}

impl WalletAdapter {
    fn inner(&self) -> &dyn WalletInterface {
        match self {
            Self::Injected(w) => w,
            Self::Native(w) => w,
        }
    }
}

#[async_trait]
impl WalletInterface for WalletAdapter {
    fn kind(&self) -> AdapterKind {
        self.inner().kind()
    }

    async fn connect(&self) -> Result<Option<String>, WalletError> {
        self.inner().connect().await
    }

    async fn transfer_native_currency(&self, to: &AccountId, amount: &str) -> TransactionOutcome {
        self.inner().transfer_native_currency(to, amount).await
    }

    async fn transfer_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        amount: u64,
    ) -> TransactionOutcome {
        self.inner().transfer_fungible_token(to, token, amount).await
    }

    async fn transfer_non_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        serial_number: u64,
    ) -> TransactionOutcome {
        self.inner()
            .transfer_non_fungible_token(to, token, serial_number)
            .await
    }

    async fn associate_token(&self, token: &TokenId) -> TransactionOutcome {
        self.inner().associate_token(token).await
    }

    async fn disconnect(&self) -> DisconnectNotice {
        self.inner().disconnect().await
    }
}
