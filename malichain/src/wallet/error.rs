//! Error types for wallet operations.
//!
//! Host providers report failures as numeric EIP-1193 codes. They are
//! classified exactly once, in [`HostErrorKind::from_code`], and turned into
//! a [`WalletError`] at the adapter boundary.

use serde::{Deserialize, Serialize};

use super::AdapterKind;
use crate::codec::CodecError;

/// Closed set of host provider error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostErrorKind {
    /// The user declined the request (4001).
    UserRejected,
    /// The requested account or method is not authorized (4100).
    Unauthorized,
    /// The provider does not support the method (4200).
    UnsupportedMethod,
    /// The provider is disconnected from all chains (4900).
    Disconnected,
    /// The provider is not connected to the requested chain (4901).
    ChainDisconnected,
    /// The chain has not been added to the host (4902).
    UnrecognizedChain,
    /// Any other code, including JSON-RPC errors.
    Other(i64),
}

impl HostErrorKind {
    /// Classify a raw provider error code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            4001 => Self::UserRejected,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            4902 => Self::UnrecognizedChain,
            other => Self::Other(other),
        }
    }
}

/// Error object returned by a host provider `request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("Provider RPC error {code}: {message}")]
pub struct ProviderRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional provider-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProviderRpcError {
    /// Create an error with a code and message.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Classified kind of this error.
    #[must_use]
    pub const fn kind(&self) -> HostErrorKind {
        HostErrorKind::from_code(self.code)
    }
}

/// Error type for wallet operations.
///
/// Covers the environment (no provider), user cancellation, network
/// registration, parameter encoding and transaction submission failures.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum WalletError {
    /// The injected provider is not installed.
    #[error("Wallet extension is not installed")]
    ProviderMissing,

    /// The user declined the request in the wallet.
    #[error("Rejected by user: {0}")]
    Rejected(String),

    /// The host does not know the target chain.
    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(String),

    /// A different adapter already holds the connection.
    #[error("Already connected: {0} wallet is active")]
    AlreadyConnected(AdapterKind),

    /// No account is connected or authorized.
    #[error("No connected account")]
    NotConnected,

    /// Any other error reported by the host provider.
    #[error("Provider error {code}: {message}")]
    Provider {
        /// Raw error code.
        code: i64,
        /// Provider message.
        message: String,
    },

    /// Identifier or amount conversion failure.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Function signature or argument encoding failure.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Transaction-related error (submission, confirmation, revert).
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Native pairing session error.
    #[error("Session error: {0}")]
    Session(String),

    /// Malformed host response.
    #[error("Unexpected response: {0}")]
    Response(String),
}

impl WalletError {
    /// Create a provider-missing error.
    #[must_use]
    pub const fn provider_missing() -> Self {
        Self::ProviderMissing
    }

    /// Create an ABI error.
    #[must_use]
    pub fn abi(msg: impl Into<String>) -> Self {
        Self::Abi(msg.into())
    }

    /// Create a transaction error.
    #[must_use]
    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    /// Create a session error.
    #[must_use]
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create an unexpected-response error.
    #[must_use]
    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response(msg.into())
    }

    /// Whether this is a benign user cancellation.
    #[must_use]
    pub const fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Whether the caller should show a blocking "not installed" notice.
    #[must_use]
    pub const fn is_environment(&self) -> bool {
        matches!(self, Self::ProviderMissing)
    }
}

impl From<ProviderRpcError> for WalletError {
    fn from(e: ProviderRpcError) -> Self {
        match e.kind() {
            HostErrorKind::UserRejected => Self::Rejected(e.message),
            HostErrorKind::UnrecognizedChain => Self::UnrecognizedChain(e.message),
            HostErrorKind::Unauthorized => Self::NotConnected,
            _ => Self::Provider {
                code: e.code,
                message: e.message,
            },
        }
    }
}
