//! `MaliChain` - wallet abstraction for a real-estate tokenization front-end.
//!
//! The UI shell talks to a single [`WalletInterface`](wallet::WalletInterface)
//! contract. Behind it sit one adapter per supported wallet kind (an injected
//! EIP-1193 provider and a native ledger pairing session), a contract-call
//! parameter builder, the account/amount codec, and the
//! [`WalletController`](connection::WalletController) that tracks which
//! adapter is active.
//!
//! ```text
//! UI shell → WalletController → WalletAdapter → host provider / ledger session
//!     ↑                                   │
//!     └──── ConnectionState (watch) ◄─────┘  accountsChanged events
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod prelude;
pub mod wallet;

pub use error::{Error, Result};
