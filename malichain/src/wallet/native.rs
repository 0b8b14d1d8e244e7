//! Native ledger wallet adapter.
//!
//! A thin layer over a vendor pairing library, reached through the
//! [`LedgerSession`] trait. Connect opens a pairing (QR code or deep link)
//! instead of querying an injected object; transfers are expressed as
//! native [`LedgerTransaction`]s and signed by the paired wallet.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::{AdapterKind, DisconnectNotice, TransactionOutcome, WalletError, WalletInterface};
use crate::codec::{AccountId, TokenId, to_base_units};

/// Decimal places of the native currency on the ledger (tinybars).
pub const HBAR_DECIMALS: u8 = 8;

/// Shown when the pairing could not be torn down from this side.
pub const DISCONNECT_NOTICE: &str = "Please disconnect using your wallet app.";

/// A transaction for the paired wallet to sign and execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerTransaction {
    /// Native currency transfer.
    HbarTransfer {
        /// Paying account.
        from: AccountId,
        /// Receiving account.
        to: AccountId,
        /// Amount in tinybars.
        tinybars: u64,
    },
    /// Fungible token transfer.
    TokenTransfer {
        /// Token type.
        token: TokenId,
        /// Sending account.
        from: AccountId,
        /// Receiving account.
        to: AccountId,
        /// Amount in the token's base units.
        amount: u64,
    },
    /// Non-fungible token transfer.
    NftTransfer {
        /// Token type.
        token: TokenId,
        /// Serial number.
        serial_number: u64,
        /// Sending account.
        from: AccountId,
        /// Receiving account.
        to: AccountId,
    },
    /// Token association.
    TokenAssociate {
        /// Account opting in.
        account: AccountId,
        /// Token types.
        tokens: Vec<TokenId>,
    },
}

impl LedgerTransaction {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HbarTransfer { .. } => "hbar_transfer",
            Self::TokenTransfer { .. } => "token_transfer",
            Self::NftTransfer { .. } => "nft_transfer",
            Self::TokenAssociate { .. } => "token_associate",
        }
    }
}

/// Pairing session with a native ledger wallet.
#[async_trait]
pub trait LedgerSession: Send + Sync + fmt::Debug {
    /// Open (or resume) a pairing and return the accounts it grants.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Rejected`] if the user declines the pairing.
    async fn pair(&self) -> Result<Vec<AccountId>, WalletError>;

    /// Have the paired wallet sign and execute `transaction`, returning the
    /// transaction id once the ledger reports a receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if signing or execution fails.
    async fn execute(&self, transaction: LedgerTransaction) -> Result<String, WalletError>;

    /// Terminate the pairing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be closed from this side.
    async fn disconnect(&self) -> Result<(), WalletError>;
}

/// Adapter for a native wallet reached through a [`LedgerSession`].
#[derive(Debug, Clone)]
pub struct NativeWallet {
    session: Arc<dyn LedgerSession>,
    account: Arc<RwLock<Option<AccountId>>>,
}

impl NativeWallet {
    /// Create the adapter over `session`.
    #[must_use]
    pub fn new(session: Arc<dyn LedgerSession>) -> Self {
        Self {
            session,
            account: Arc::new(RwLock::new(None)),
        }
    }

    /// The paired account, if any.
    pub async fn account(&self) -> Option<AccountId> {
        *self.account.read().await
    }

    async fn paired_account(&self) -> Result<AccountId, WalletError> {
        self.account().await.ok_or(WalletError::NotConnected)
    }

    async fn execute(&self, transaction: LedgerTransaction) -> TransactionOutcome {
        let operation = transaction.name();
        match self.session.execute(transaction).await {
            Ok(id) => {
                info!(operation, transaction_id = %id, "transaction executed");
                TransactionOutcome::Submitted(id)
            }
            Err(e) => log_failure(operation, &e),
        }
    }

    async fn build_and_execute<F>(&self, operation: &str, build: F) -> TransactionOutcome
    where
        F: FnOnce(AccountId) -> Result<LedgerTransaction, WalletError> + Send,
    {
        match self.paired_account().await.and_then(build) {
            Ok(transaction) => self.execute(transaction).await,
            Err(e) => log_failure(operation, &e),
        }
    }
}

fn log_failure(operation: &str, e: &WalletError) -> TransactionOutcome {
    if e.is_user_rejection() {
        warn!(operation, error = %e, "transaction cancelled by user");
    } else {
        error!(operation, error = %e, "transaction not sent");
    }
    TransactionOutcome::NotSubmitted
}

#[async_trait]
impl WalletInterface for NativeWallet {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Native
    }

    async fn connect(&self) -> Result<Option<String>, WalletError> {
        match self.session.pair().await {
            Ok(accounts) => {
                let account = accounts.into_iter().next();
                *self.account.write().await = account;
                match account {
                    Some(id) => info!(account = %id, "native wallet paired"),
                    None => info!("pairing granted no accounts"),
                }
                Ok(account.map(|id| id.to_string()))
            }
            Err(e) if e.is_user_rejection() => {
                warn!(error = %e, "pairing cancelled by user");
                Ok(None)
            }
            Err(e) => {
                error!(error = %e, "pairing failed");
                Ok(None)
            }
        }
    }

    async fn transfer_native_currency(&self, to: &AccountId, amount: &str) -> TransactionOutcome {
        let to = *to;
        self.build_and_execute("hbar_transfer", |from| {
            let value = to_base_units(amount, HBAR_DECIMALS)?;
            let tinybars = u64::try_from(value).map_err(|_| {
                WalletError::Codec(crate::codec::CodecError::OutOfRange(amount.to_owned()))
            })?;
            Ok(LedgerTransaction::HbarTransfer { from, to, tinybars })
        })
        .await
    }

    async fn transfer_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        amount: u64,
    ) -> TransactionOutcome {
        let (to, token) = (*to, *token);
        self.build_and_execute("token_transfer", |from| {
            Ok(LedgerTransaction::TokenTransfer {
                token,
                from,
                to,
                amount,
            })
        })
        .await
    }

    async fn transfer_non_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        serial_number: u64,
    ) -> TransactionOutcome {
        let (to, token) = (*to, *token);
        self.build_and_execute("nft_transfer", |from| {
            Ok(LedgerTransaction::NftTransfer {
                token,
                serial_number,
                from,
                to,
            })
        })
        .await
    }

    async fn associate_token(&self, token: &TokenId) -> TransactionOutcome {
        let token = *token;
        self.build_and_execute("token_associate", |account| {
            Ok(LedgerTransaction::TokenAssociate {
                account,
                tokens: vec![token],
            })
        })
        .await
    }

    async fn disconnect(&self) -> DisconnectNotice {
        *self.account.write().await = None;
        match self.session.disconnect().await {
            Ok(()) => {
                info!("native wallet session terminated");
                DisconnectNotice::SessionTerminated
            }
            Err(e) => {
                warn!(error = %e, "could not terminate native wallet session");
                DisconnectNotice::ManualActionRequired(DISCONNECT_NOTICE.to_owned())
            }
        }
    }
}
