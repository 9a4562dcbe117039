//! Runtime settings shared by the liquidity and swap controllers

use crate::error::Result;
use diamond_amm::FeeRate;
use diamond_config::ExchangeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeSettings {
    /// Writes are refused on any other chain
    pub required_chain_id: u64,
    /// Must equal the exchange contract's fee constants
    pub fee: FeeRate,
    pub slippage_bps: u32,
    /// Cross-check every swap quote with the contract
    pub verify_quotes: bool,
}

impl ExchangeSettings {
    pub fn from_config(config: &ExchangeConfig) -> Result<Self> {
        Ok(Self {
            required_chain_id: config.network.chain_id,
            fee: FeeRate::new(config.fees.numerator, config.fees.denominator)?,
            slippage_bps: config.trading.slippage_bps,
            verify_quotes: config.trading.verify_quotes,
        })
    }
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            required_chain_id: diamond_config::deployment::DEFAULT_CHAIN_ID,
            fee: FeeRate::EXCHANGE,
            slippage_bps: diamond_config::deployment::trading::DEFAULT_SLIPPAGE_BPS,
            verify_quotes: true,
        }
    }
}
