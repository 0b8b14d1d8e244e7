//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use malichain::prelude::*;
//! ```

pub use crate::codec::{AccountId, LedgerNetwork, TokenId, from_base_units, to_base_units};
pub use crate::config::{AppConfig, GasLimit, GasLimits, NetworkConfig};
pub use crate::connection::{ConnectOutcome, ConnectionSnapshot, ConnectionState, WalletController};
pub use crate::error::{Error, Result};
pub use crate::wallet::{
    AccountSubscription, AdapterKind, ContractFunctionParameterBuilder, DisconnectNotice,
    EventHandler, HostProvider, InjectedWallet, LedgerSession, LedgerTransaction, NativeWallet,
    ProviderRpcError, SharedHostProvider, TransactionOutcome, WalletAdapter, WalletError,
    WalletInterface,
};
