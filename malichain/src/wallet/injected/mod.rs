//! Injected-provider adapter.
//!
//! Drives a browser extension exposing an EIP-1193 provider:
//! `Disconnected → NetworkCheck → Connected`. Transactions are built as
//! [`alloy`] `TransactionRequest`s, contract calls are ABI-encoded from a
//! [`ContractFunctionParameterBuilder`], and everything is submitted through
//! the host's `eth_sendTransaction`.

mod network;
mod subscription;

use std::sync::Arc;

use alloy::dyn_abi::JsonAbiExt;
use alloy::json_abi::Function;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use async_trait::async_trait;
use futures_timer::Delay;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

pub use network::{AddEthereumChainParameter, NativeCurrency};
pub use subscription::AccountSubscription;

use super::host::{ACCOUNTS_CHANGED, EventHandler, SharedHostProvider, methods};
use super::params::ContractFunctionParameterBuilder;
use super::{AdapterKind, DisconnectNotice, TransactionOutcome, WalletError, WalletInterface};
use crate::codec::{AccountId, TokenId, to_base_units};
use crate::config::{AppConfig, GasLimit};
use crate::connection::ConnectionState;

/// Shown after `disconnect`: extensions keep their own authorization.
pub const DISCONNECT_NOTICE: &str = "Please disconnect using the wallet extension.";

/// Adapter for an injected EIP-1193 provider.
///
/// Holds no connection state of its own; the active account lives in
/// [`ConnectionState`] and is re-read from the host on every operation.
#[derive(Debug, Clone)]
pub struct InjectedWallet {
    host: Option<SharedHostProvider>,
    config: Arc<AppConfig>,
}

impl InjectedWallet {
    /// Create the adapter. `host` is `None` when no extension is installed.
    #[must_use]
    pub fn new(host: Option<SharedHostProvider>, config: AppConfig) -> Self {
        Self {
            host,
            config: Arc::new(config),
        }
    }

    /// Whether an injected provider is present.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.host.is_some()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn host(&self) -> Result<&SharedHostProvider, WalletError> {
        self.host.as_ref().ok_or_else(WalletError::provider_missing)
    }

    /// Switch the host to the configured network, registering it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is missing, the user declines, or
    /// the switch still fails after registering the network.
    pub async fn switch_network(&self) -> Result<(), WalletError> {
        network::switch_network(self.host()?.as_ref(), &self.config.network).await
    }

    /// Ask the host for authorized accounts, prompting the user if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is missing, the user declines, or the
    /// response is not a list of addresses.
    pub async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self
            .host()?
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await?;
        parse_accounts(&value)
    }

    /// Read the currently authorized accounts without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is missing or the response is malformed.
    pub async fn authorized_accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self.host()?.request(methods::ACCOUNTS, json!([])).await?;
        parse_accounts(&value)
    }

    async fn signer_address(&self) -> Result<Address, WalletError> {
        let accounts = self.request_accounts().await?;
        let first = accounts.first().ok_or(WalletError::NotConnected)?;
        first
            .parse()
            .map_err(|e| WalletError::response(format!("signer address '{first}': {e}")))
    }

    /// Submit a transaction and return its hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the transaction or returns a
    /// malformed hash.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, WalletError> {
        let value = self
            .host()?
            .request(methods::SEND_TRANSACTION, json!([tx]))
            .await?;
        let hash = value
            .as_str()
            .ok_or_else(|| WalletError::response(format!("transaction hash: {value}")))?;
        debug!(hash, "transaction accepted by host");
        Ok(hash.to_owned())
    }

    /// Poll for the receipt of `hash` until it is mined.
    ///
    /// There is no overall timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if a receipt request fails or the transaction reverted.
    pub async fn wait_for_confirmation(&self, hash: &str) -> Result<(), WalletError> {
        let host = self.host()?;
        loop {
            let receipt = host
                .request(methods::TRANSACTION_RECEIPT, json!([hash]))
                .await?;
            if !receipt.is_null() {
                return match receipt.get("status").and_then(Value::as_str) {
                    Some("0x0") => Err(WalletError::transaction(format!("{hash} reverted"))),
                    _ => Ok(()),
                };
            }
            Delay::new(self.config.poll_interval()).await;
        }
    }

    /// Invoke `function_name` on `contract` with `params` and return the
    /// outcome once the host has accepted the transaction.
    ///
    /// The interface is a single-function ABI built from the builder's
    /// parameter list; [`GasLimit::Estimate`] leaves gas to the host.
    pub async fn execute_contract_function(
        &self,
        contract: Address,
        function_name: &str,
        params: &ContractFunctionParameterBuilder,
        gas_limit: GasLimit,
    ) -> TransactionOutcome {
        let result = self
            .try_execute_contract_function(contract, function_name, params, gas_limit)
            .await;
        into_outcome(function_name, result)
    }

    async fn try_execute_contract_function(
        &self,
        contract: Address,
        function_name: &str,
        params: &ContractFunctionParameterBuilder,
        gas_limit: GasLimit,
    ) -> Result<String, WalletError> {
        let data = encode_function_call(function_name, params)?;
        let from = self.signer_address().await?;
        self.submit_call(from, contract, data, gas_limit).await
    }

    async fn submit_call(
        &self,
        from: Address,
        contract: Address,
        data: Bytes,
        gas_limit: GasLimit,
    ) -> Result<String, WalletError> {
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(contract);
        tx.input = TransactionInput::both(data);
        if let Some(limit) = gas_limit.cap() {
            tx = tx.with_gas_limit(limit);
        }
        self.send_transaction(&tx).await
    }

    async fn try_transfer_native(
        &self,
        to: &AccountId,
        amount: &str,
    ) -> Result<String, WalletError> {
        let value = to_base_units(amount, self.config.network.native_currency_decimals)?;
        let from = self.signer_address().await?;
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to.to_solidity_address())
            .with_value(value);
        if let Some(limit) = self.config.gas_limits.native_transfer.cap() {
            tx = tx.with_gas_limit(limit);
        }
        let hash = self.send_transaction(&tx).await?;
        self.wait_for_confirmation(&hash).await?;
        Ok(hash)
    }

    async fn try_transfer_non_fungible(
        &self,
        to: &AccountId,
        token: &TokenId,
        serial_number: u64,
    ) -> Result<String, WalletError> {
        // The signer is both the `from` argument and the sender.
        let from = self.signer_address().await?;
        let params = ContractFunctionParameterBuilder::new()
            .add_address("from", from)
            .add_account("to", to)
            .add_uint256("nftId", serial_number);
        let data = encode_function_call("transferFrom", &params)?;
        self.submit_call(
            from,
            token.to_contract_address(),
            data,
            self.config.gas_limits.non_fungible_transfer,
        )
        .await
    }

    /// Register an `accountsChanged` listener that keeps `state` in sync.
    ///
    /// A notification with accounts adopts the first one; an empty one clears
    /// the connected address. The returned handle removes the listener when
    /// released or dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::ProviderMissing`] if no provider is installed.
    pub fn observe_account_changes(
        &self,
        state: ConnectionState,
    ) -> Result<AccountSubscription, WalletError> {
        let host = Arc::clone(self.host()?);
        let handler: EventHandler = Arc::new(move |payload: &Value| {
            match parse_accounts(payload) {
                Ok(accounts) => {
                    let applied = state.apply_accounts_changed(AdapterKind::Injected, &accounts);
                    debug!(count = accounts.len(), applied, "accountsChanged");
                }
                Err(e) => warn!(error = %e, "ignoring malformed accountsChanged payload"),
            }
        });
        host.on(ACCOUNTS_CHANGED, handler);
        debug!("registered accountsChanged listener");
        Ok(AccountSubscription::new(host))
    }

    /// Silently read the authorized accounts and apply them to `state`.
    ///
    /// Used when a UI session attaches, before any event has arrived.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is missing or the read fails.
    pub async fn sync_accounts(
        &self,
        state: &ConnectionState,
    ) -> Result<Option<String>, WalletError> {
        let accounts = self.authorized_accounts().await?;
        state.apply_accounts_changed(AdapterKind::Injected, &accounts);
        Ok(accounts.into_iter().next())
    }
}

#[async_trait]
impl WalletInterface for InjectedWallet {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Injected
    }

    async fn connect(&self) -> Result<Option<String>, WalletError> {
        self.host()?;

        if let Err(e) = self.switch_network().await {
            log_connect_failure("switch network", &e);
            return Ok(None);
        }

        match self.request_accounts().await {
            Ok(accounts) => {
                let account = accounts.into_iter().next();
                match &account {
                    Some(address) => info!(account = %address, "injected wallet connected"),
                    None => info!("injected wallet has no authorized accounts"),
                }
                Ok(account)
            }
            Err(e) => {
                log_connect_failure("request accounts", &e);
                Ok(None)
            }
        }
    }

    async fn transfer_native_currency(&self, to: &AccountId, amount: &str) -> TransactionOutcome {
        let result = self.try_transfer_native(to, amount).await;
        into_outcome("transfer_native_currency", result)
    }

    async fn transfer_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        amount: u64,
    ) -> TransactionOutcome {
        let params = ContractFunctionParameterBuilder::new()
            .add_account("recipient", to)
            .add_uint256("amount", amount);
        self.execute_contract_function(
            token.to_contract_address(),
            "transfer",
            &params,
            self.config.gas_limits.fungible_transfer,
        )
        .await
    }

    async fn transfer_non_fungible_token(
        &self,
        to: &AccountId,
        token: &TokenId,
        serial_number: u64,
    ) -> TransactionOutcome {
        let result = self
            .try_transfer_non_fungible(to, token, serial_number)
            .await;
        into_outcome("transferFrom", result)
    }

    async fn associate_token(&self, token: &TokenId) -> TransactionOutcome {
        self.execute_contract_function(
            token.to_contract_address(),
            "associate",
            &ContractFunctionParameterBuilder::new(),
            self.config.gas_limits.associate,
        )
        .await
    }

    async fn disconnect(&self) -> DisconnectNotice {
        // EIP-1193 has no method to revoke an extension's authorization.
        info!("injected wallet disconnected locally");
        DisconnectNotice::ManualActionRequired(DISCONNECT_NOTICE.to_owned())
    }
}

/// ABI-encode a call to `function_name` with the builder's parameters.
///
/// # Errors
///
/// Returns [`WalletError::Abi`] if the signature does not parse or the
/// values do not match the declared types.
pub fn encode_function_call(
    function_name: &str,
    params: &ContractFunctionParameterBuilder,
) -> Result<Bytes, WalletError> {
    let signature = format!(
        "function {function_name}({})",
        params.build_abi_function_params()
    );
    let function = Function::parse(&signature)
        .map_err(|e| WalletError::abi(format!("invalid signature '{signature}': {e}")))?;
    let data = function
        .abi_encode_input(&params.build_arguments())
        .map_err(|e| WalletError::abi(format!("encoding '{signature}' failed: {e}")))?;
    Ok(data.into())
}

/// Parse an account list payload into EIP-55 checksummed addresses.
fn parse_accounts(value: &Value) -> Result<Vec<String>, WalletError> {
    let raw: Vec<String> = serde_json::from_value(value.clone())
        .map_err(|e| WalletError::response(format!("account list {value}: {e}")))?;
    raw.iter()
        .map(|s| {
            s.parse::<Address>()
                .map(|a| a.to_checksum(None))
                .map_err(|e| WalletError::response(format!("account '{s}': {e}")))
        })
        .collect()
}

fn log_connect_failure(step: &str, e: &WalletError) {
    if e.is_user_rejection() {
        warn!(step, error = %e, "connect cancelled by user");
    } else {
        error!(step, error = %e, "connect attempt aborted");
    }
}

fn into_outcome(operation: &str, result: Result<String, WalletError>) -> TransactionOutcome {
    match result {
        Ok(hash) => {
            info!(operation, hash = %hash, "transaction submitted");
            TransactionOutcome::Submitted(hash)
        }
        Err(e) if e.is_user_rejection() => {
            warn!(operation, error = %e, "transaction cancelled by user");
            TransactionOutcome::NotSubmitted
        }
        Err(e) => {
            error!(operation, error = %e, "transaction not sent");
            TransactionOutcome::NotSubmitted
        }
    }
}
