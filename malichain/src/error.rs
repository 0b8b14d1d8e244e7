//! Unified error types for the malichain crate.
//!
//! Adapter faults never cross the [`WalletInterface`](crate::wallet::WalletInterface)
//! boundary; this hierarchy is what the fallible helpers underneath it
//! (codec, configuration, host requests) return.

use crate::codec::CodecError;
use crate::config::ConfigError;
use crate::wallet::WalletError;

/// Result type alias for malichain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the malichain crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Wallet adapter or host provider error.
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// Identifier or amount conversion error.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration loading or validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
