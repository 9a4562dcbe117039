//! Pool snapshot and trade direction for the ether/DH exchange

use crate::error::Result;
use crate::fee::FeeRate;
use crate::liquidity_math::{LiquidityMath, RemovalAmounts};
use crate::swap_math::SwapMath;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Which side of the pool is being sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    /// Sell ether, buy DH tokens
    EthToToken,
    /// Sell DH tokens, buy ether
    TokenToEth,
}

/// Exchange balances read from the chain right before a calculation
///
/// Never cached: a snapshot is taken, used for one quote, and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub ether_reserve: U256,
    pub token_reserve: U256,
    pub lp_supply: U256,
}

impl PoolSnapshot {
    pub fn new(ether_reserve: U256, token_reserve: U256, lp_supply: U256) -> Self {
        Self {
            ether_reserve,
            token_reserve,
            lp_supply,
        }
    }

    /// No ether in the pool yet; the next provider chooses the ratio
    pub fn is_uninitialized(&self) -> bool {
        self.ether_reserve.is_zero()
    }

    /// `(input_reserve, output_reserve)` for a trade in `direction`
    pub fn reserves_for(&self, direction: SwapDirection) -> (U256, U256) {
        match direction {
            SwapDirection::EthToToken => (self.ether_reserve, self.token_reserve),
            SwapDirection::TokenToEth => (self.token_reserve, self.ether_reserve),
        }
    }

    pub fn paired_token_amount(&self, ether_in: U256) -> Result<U256> {
        LiquidityMath::paired_token_amount(ether_in, self.ether_reserve, self.token_reserve)
    }

    pub fn lp_tokens_for_deposit(&self, ether_in: U256) -> Result<U256> {
        LiquidityMath::lp_tokens_for_deposit(ether_in, self.ether_reserve, self.lp_supply)
    }

    pub fn removal_amounts(&self, lp_to_remove: U256) -> Result<RemovalAmounts> {
        LiquidityMath::removal_amounts(
            lp_to_remove,
            self.lp_supply,
            self.ether_reserve,
            self.token_reserve,
        )
    }

    pub fn swap_output(&self, direction: SwapDirection, input: U256, fee: FeeRate) -> Result<U256> {
        let (input_reserve, output_reserve) = self.reserves_for(direction);
        SwapMath::output_amount(input, input_reserve, output_reserve, fee)
    }

    pub fn price_impact_bps(&self, direction: SwapDirection, input: U256) -> Result<U256> {
        let (input_reserve, output_reserve) = self.reserves_for(direction);
        SwapMath::price_impact_bps(input, input_reserve, output_reserve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AmmError;

    fn pool() -> PoolSnapshot {
        PoolSnapshot::new(U256::from(1000), U256::from(2000), U256::from(500))
    }

    #[test]
    fn test_reserves_follow_direction() {
        let p = pool();
        assert_eq!(
            p.reserves_for(SwapDirection::EthToToken),
            (U256::from(1000), U256::from(2000))
        );
        assert_eq!(
            p.reserves_for(SwapDirection::TokenToEth),
            (U256::from(2000), U256::from(1000))
        );
    }

    #[test]
    fn test_swap_both_directions() {
        let p = pool();
        // 9900 * 2000 / (100000 + 9900) = 180.16
        assert_eq!(
            p.swap_output(SwapDirection::EthToToken, U256::from(100), FeeRate::EXCHANGE)
                .unwrap(),
            U256::from(180)
        );
        // 9900 * 1000 / (200000 + 9900) = 47.16
        assert_eq!(
            p.swap_output(SwapDirection::TokenToEth, U256::from(100), FeeRate::EXCHANGE)
                .unwrap(),
            U256::from(47)
        );
    }

    #[test]
    fn test_empty_pool() {
        let empty = PoolSnapshot::default();
        assert!(empty.is_uninitialized());
        assert!(matches!(
            empty.paired_token_amount(U256::from(1)),
            Err(AmmError::InvalidPrecondition(_))
        ));
        assert!(empty.removal_amounts(U256::zero()).is_err());
        assert!(empty
            .swap_output(SwapDirection::EthToToken, U256::from(1), FeeRate::EXCHANGE)
            .is_err());
        assert_eq!(empty.lp_tokens_for_deposit(U256::from(7)).unwrap(), U256::from(7));
    }
}
