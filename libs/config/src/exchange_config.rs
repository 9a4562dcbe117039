//! Exchange Client Configuration
//!
//! Layered loading: built-in defaults, then an optional TOML file, then
//! `DIAMOND__SECTION__KEY` environment variables. `${VAR}` references in
//! the RPC URL are expanded after loading.

use crate::deployment::{self, fee, trading};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Complete configuration for the exchange client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExchangeConfig {
    pub network: NetworkConfig,
    pub contracts: ContractsConfig,
    pub fees: FeeConfig,
    pub trading: TradingConfig,
    pub wallet: WalletConfig,
    pub logging: LoggingConfig,
}

/// RPC endpoint and the only network writes are allowed on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    /// Writes are refused on any other chain
    pub chain_id: u64,
}

/// Deployed contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Exchange (AMM + LP token) contract
    pub exchange: String,
    /// Diamond Hands ERC20 token contract
    pub token: String,
}

/// Input-side fee, must equal the exchange contract's constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    pub numerator: u64,
    pub denominator: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Accepted output shortfall versus the quote (basis points)
    pub slippage_bps: u32,
    /// Cross-check local quotes against the contract's `getAmountOfTokens`
    pub verify_quotes: bool,
    /// Blocks to wait after inclusion
    pub confirmations: usize,
    pub confirmation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Name of the environment variable that holds the private key
    pub private_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: deployment::DEFAULT_RPC_URL.to_string(),
            chain_id: deployment::DEFAULT_CHAIN_ID,
        }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            exchange: deployment::ZERO_ADDRESS.to_string(),
            token: deployment::ZERO_ADDRESS.to_string(),
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            numerator: fee::NUMERATOR,
            denominator: fee::DENOMINATOR,
        }
    }
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            slippage_bps: trading::DEFAULT_SLIPPAGE_BPS,
            verify_quotes: true,
            confirmations: trading::DEFAULT_CONFIRMATIONS,
            confirmation_timeout_secs: trading::DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: trading::DEFAULT_PRIVATE_KEY_ENV.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ExchangeConfig {
    /// Load configuration with an optional TOML file and environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!("Loading exchange config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (DIAMOND__ prefix)
        builder = builder.add_source(
            Environment::with_prefix("DIAMOND")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.expand_env_vars()?;
        debug!("Effective config: {:?}", config);
        Ok(config)
    }

    /// Expand `${VAR}` references in the RPC URL
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let expanded =
            shellexpand::env(&self.network.rpc_url).context("Failed to expand RPC URL")?;
        self.network.rpc_url = expanded.to_string();
        Ok(())
    }

    pub fn exchange_address(&self) -> Result<Address> {
        parse_address(&self.contracts.exchange, "contracts.exchange")
    }

    pub fn token_address(&self) -> Result<Address> {
        parse_address(&self.contracts.token, "contracts.token")
    }

    /// Serialize as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.network.rpc_url.is_empty() {
            bail!("network.rpc_url must be set");
        }
        if self.network.chain_id == 0 {
            bail!("network.chain_id must be positive");
        }

        let exchange = self.exchange_address()?;
        let token = self.token_address()?;
        if exchange.is_zero() || token.is_zero() {
            bail!("contracts.exchange and contracts.token must name a deployment");
        }
        if exchange == token {
            bail!("contracts.exchange and contracts.token must differ");
        }

        if self.fees.denominator == 0 || self.fees.numerator == 0 {
            bail!("fees.numerator and fees.denominator must be positive");
        }
        if self.fees.numerator > self.fees.denominator {
            bail!("fees.numerator must be <= fees.denominator");
        }

        if self.trading.slippage_bps > 10_000 {
            bail!("trading.slippage_bps must be <= 10000 (100%)");
        }
        if self.trading.confirmation_timeout_secs == 0 {
            bail!("trading.confirmation_timeout_secs must be positive");
        }

        if self.wallet.private_key_env.is_empty() {
            bail!("wallet.private_key_env must name an environment variable");
        }

        Ok(())
    }
}

fn parse_address(value: &str, field: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("Invalid {} address: {}", field, value))
}
