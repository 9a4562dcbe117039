//! Liquidity provisioning math for the ether/DH pool
//!
//! Deposits must keep the pool ratio, withdrawals return a pro-rata share of
//! both reserves. All divisions truncate exactly like the exchange contract.

use crate::error::{AmmError, Result};
use crate::math::mul_div_floor;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Ether and token amounts returned for burning LP tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalAmounts {
    pub ether_out: U256,
    pub token_out: U256,
}

/// Liquidity math with exact truncating division
pub struct LiquidityMath;

impl LiquidityMath {
    /// Token amount that must accompany `ether_in` to keep the pool ratio
    ///
    /// `floor(ether_in * token_reserve / ether_reserve)`. An empty pool
    /// (`ether_reserve == 0`) has no ratio yet; the first provider picks one,
    /// so that case is an error here and must be handled by the caller.
    pub fn paired_token_amount(
        ether_in: U256,
        ether_reserve: U256,
        token_reserve: U256,
    ) -> Result<U256> {
        if ether_reserve.is_zero() {
            return Err(AmmError::InvalidPrecondition(
                "pool has no liquidity yet, the first provider sets the ratio",
            ));
        }
        mul_div_floor(ether_in, token_reserve, ether_reserve, "paired token amount")
    }

    /// Pro-rata share of both reserves for burning `lp_to_remove` LP tokens
    ///
    /// # Arguments
    /// * `lp_to_remove` - LP tokens being burned
    /// * `lp_supply` - Total LP supply before the burn
    /// * `ether_reserve` - Ether held by the exchange
    /// * `token_reserve` - DH tokens held by the exchange
    pub fn removal_amounts(
        lp_to_remove: U256,
        lp_supply: U256,
        ether_reserve: U256,
        token_reserve: U256,
    ) -> Result<RemovalAmounts> {
        if lp_supply.is_zero() {
            return Err(AmmError::InvalidPrecondition(
                "LP supply is zero, there is no liquidity to remove",
            ));
        }
        if lp_to_remove > lp_supply {
            return Err(AmmError::OutOfRange("LP amount exceeds total LP supply"));
        }

        let ether_out = mul_div_floor(ether_reserve, lp_to_remove, lp_supply, "ether out")?;
        let token_out = mul_div_floor(token_reserve, lp_to_remove, lp_supply, "token out")?;

        Ok(RemovalAmounts {
            ether_out,
            token_out,
        })
    }

    /// LP tokens minted by the exchange for a deposit of `ether_in`
    ///
    /// The first deposit mints one LP token per wei. Later deposits mint
    /// `floor(lp_supply * ether_in / ether_reserve)` where `ether_reserve`
    /// is the balance before the deposit.
    pub fn lp_tokens_for_deposit(
        ether_in: U256,
        ether_reserve: U256,
        lp_supply: U256,
    ) -> Result<U256> {
        if ether_reserve.is_zero() {
            return Ok(ether_in);
        }
        mul_div_floor(lp_supply, ether_in, ether_reserve, "LP tokens minted")
    }
}
