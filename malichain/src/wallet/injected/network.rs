//! Chain switch / registration against the injected provider.

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::NetworkConfig;
use crate::wallet::host::{HostProvider, methods};
use crate::wallet::{HostErrorKind, ProviderRpcError, WalletError};

/// `wallet_addEthereumChain` parameter (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    /// Hex chain id.
    pub chain_id: String,
    /// Display name.
    pub chain_name: String,
    /// Native currency metadata.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    pub rpc_urls: Vec<String>,
}

/// Native currency metadata for [`AddEthereumChainParameter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

impl From<&NetworkConfig> for AddEthereumChainParameter {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id_hex.clone(),
            chain_name: network.display_name.clone(),
            native_currency: NativeCurrency {
                name: network.native_currency_name.clone(),
                symbol: network.native_currency_symbol.clone(),
                decimals: network.native_currency_decimals,
            },
            rpc_urls: vec![network.rpc_url.clone()],
        }
    }
}

async fn request_switch(
    host: &dyn HostProvider,
    network: &NetworkConfig,
) -> Result<(), ProviderRpcError> {
    host.request(
        methods::SWITCH_CHAIN,
        json!([{ "chainId": network.chain_id_hex }]),
    )
    .await
    .map(|_| ())
}

/// Switch the host to `network`, registering it first if the host does not
/// know the chain. The switch is retried exactly once after registration.
pub(super) async fn switch_network(
    host: &dyn HostProvider,
    network: &NetworkConfig,
) -> Result<(), WalletError> {
    let Err(err) = request_switch(host, network).await else {
        debug!(chain_id = %network.chain_id_hex, "switched network");
        return Ok(());
    };
    if err.kind() != HostErrorKind::UnrecognizedChain {
        return Err(err.into());
    }

    info!(
        chain_id = %network.chain_id_hex,
        name = %network.display_name,
        "host does not know the network, registering it",
    );
    let param = AddEthereumChainParameter::from(network);
    host.request(methods::ADD_CHAIN, json!([param])).await?;
    request_switch(host, network).await?;
    debug!(chain_id = %network.chain_id_hex, "switched network after registration");
    Ok(())
}
