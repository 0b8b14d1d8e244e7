//! Deployment configuration.
//!
//! One fixed [`NetworkConfig`] entry (the pre-selected deployment target),
//! the per-operation [`GasLimits`] policy and the confirmation poll interval.
//! Loaded once from TOML or built from a preset; there is no runtime
//! switching.
//!
//! ```toml
//! confirmation_poll_interval_ms = 1000
//!
//! [network]
//! network = "testnet"
//! chain_id_hex = "0x128"
//! display_name = "Hedera (testnet)"
//! rpc_url = "https://testnet.hashio.io/api"
//! native_currency_name = "HBAR"
//! native_currency_symbol = "HBAR"
//! native_currency_decimals = 18
//!
//! [gas_limits]
//! native_transfer = -1
//! fungible_transfer = 50000
//! non_fungible_transfer = 100000
//! associate = 800000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::LedgerNetwork;

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// Invalid value.
    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Sentinel used on the wire for [`GasLimit::Estimate`].
pub const GAS_LIMIT_ESTIMATE: i64 = -1;

/// Gas limit policy for one kind of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum GasLimit {
    /// No explicit cap; the host estimates gas.
    #[default]
    Estimate,
    /// Fixed gas limit.
    Fixed(u64),
}

impl GasLimit {
    /// The explicit cap, if any.
    #[must_use]
    pub const fn cap(self) -> Option<u64> {
        match self {
            Self::Estimate => None,
            Self::Fixed(limit) => Some(limit),
        }
    }
}

impl TryFrom<i64> for GasLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            GAS_LIMIT_ESTIMATE => Ok(Self::Estimate),
            v => u64::try_from(v)
                .map(Self::Fixed)
                .map_err(|_| format!("gas limit must be -1 or non-negative, got {v}")),
        }
    }
}

impl From<GasLimit> for i64 {
    fn from(limit: GasLimit) -> Self {
        match limit {
            GasLimit::Estimate => GAS_LIMIT_ESTIMATE,
            GasLimit::Fixed(v) => Self::try_from(v).unwrap_or(Self::MAX),
        }
    }
}

/// Gas limit per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasLimits {
    /// Native currency transfer.
    pub native_transfer: GasLimit,
    /// Fungible token `transfer`.
    pub fungible_transfer: GasLimit,
    /// Non-fungible token `transferFrom`.
    pub non_fungible_transfer: GasLimit,
    /// Token `associate`.
    pub associate: GasLimit,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            native_transfer: GasLimit::Estimate,
            fungible_transfer: GasLimit::Fixed(50_000),
            non_fungible_transfer: GasLimit::Fixed(100_000),
            associate: GasLimit::Fixed(800_000),
        }
    }
}

/// Network entry handed to host providers when switching or registering
/// the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Ledger the entity ids and checksums belong to.
    pub network: LedgerNetwork,
    /// Chain id as a `0x`-prefixed hex string.
    pub chain_id_hex: String,
    /// Human-readable chain name shown by the host.
    pub display_name: String,
    /// JSON-RPC relay URL.
    pub rpc_url: String,
    /// Native currency name.
    pub native_currency_name: String,
    /// Native currency symbol.
    pub native_currency_symbol: String,
    /// Decimals of the native currency on the JSON-RPC relay.
    pub native_currency_decimals: u8,
}

impl NetworkConfig {
    fn preset(network: LedgerNetwork, chain_id_hex: &str) -> Self {
        Self {
            network,
            chain_id_hex: chain_id_hex.to_owned(),
            display_name: format!("Hedera ({network})"),
            rpc_url: format!("https://{network}.hashio.io/api"),
            native_currency_name: "HBAR".to_owned(),
            native_currency_symbol: "HBAR".to_owned(),
            native_currency_decimals: 18,
        }
    }

    /// Production network (chain id 295).
    #[must_use]
    pub fn mainnet() -> Self {
        Self::preset(LedgerNetwork::Mainnet, "0x127")
    }

    /// Test network (chain id 296).
    #[must_use]
    pub fn testnet() -> Self {
        Self::preset(LedgerNetwork::Testnet, "0x128")
    }

    /// Preview network (chain id 297).
    #[must_use]
    pub fn previewnet() -> Self {
        Self::preset(LedgerNetwork::Previewnet, "0x129")
    }

    /// Numeric chain id.
    ///
    /// # Errors
    ///
    /// Returns an error if `chain_id_hex` is not a `0x`-prefixed hex number.
    pub fn chain_id(&self) -> ConfigResult<u64> {
        let digits = self
            .chain_id_hex
            .strip_prefix("0x")
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "chain_id_hex must be 0x-prefixed, got '{}'",
                    self.chain_id_hex
                ))
            })?;
        u64::from_str_radix(digits, 16).map_err(|e| {
            ConfigError::InvalidValue(format!("chain_id_hex '{}': {e}", self.chain_id_hex))
        })
    }

    /// Validate the entry.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.chain_id()?;
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("rpc_url is empty".into()));
        }
        if self.native_currency_symbol.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "native_currency_symbol is empty".into(),
            ));
        }
        if self.native_currency_decimals > 77 {
            return Err(ConfigError::InvalidValue(format!(
                "native_currency_decimals {} exceeds 77",
                self.native_currency_decimals
            )));
        }
        Ok(())
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// The deployment target.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Gas limit policy.
    #[serde(default)]
    pub gas_limits: GasLimits,

    /// Delay between receipt polls while awaiting confirmation.
    #[serde(default = "default_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            gas_limits: GasLimits::default(),
            confirmation_poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Configuration for `network` with default gas limits.
    #[must_use]
    pub fn for_network(network: NetworkConfig) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), network = %config.network.network, "loaded config file");
        Ok(config)
    }

    /// Validate all sections.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.network.validate()?;
        if self.confirmation_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "confirmation_poll_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Receipt poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }
}
