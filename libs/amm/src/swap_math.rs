//! Constant-product swap math with an input-side fee
//!
//! Mirrors the exchange contract's `getAmountOfTokens` bit for bit:
//!
//! ```text
//! with_fee    = input * fee_num
//! numerator   = with_fee * output_reserve
//! denominator = input_reserve * fee_den + with_fee
//! output      = numerator / denominator        (truncating)
//! ```
//!
//! The output is always strictly below `output_reserve`: the denominator
//! exceeds `with_fee` whenever `input_reserve > 0`.

use crate::error::{AmmError, Result};
use crate::fee::{FeeRate, BPS_DENOMINATOR};
use crate::math::{checked_add, checked_mul, mul_div_floor};
use ethers_core::types::U256;

/// Swap math functions with exact 256-bit arithmetic
pub struct SwapMath;

impl SwapMath {
    /// Calculate the output amount for `input` sold into the pool
    ///
    /// # Arguments
    /// * `input` - Amount being sold (wei or DH base units)
    /// * `input_reserve` - Pool reserve of the asset being sold
    /// * `output_reserve` - Pool reserve of the asset being bought
    /// * `fee` - Fraction of the input that reaches the curve
    ///
    /// # Returns
    /// Output amount, rounded down
    pub fn output_amount(
        input: U256,
        input_reserve: U256,
        output_reserve: U256,
        fee: FeeRate,
    ) -> Result<U256> {
        if input_reserve.is_zero() || output_reserve.is_zero() {
            return Err(AmmError::InvalidPrecondition("reserves must be positive"));
        }

        let with_fee = checked_mul(input, fee.numerator_u256(), "input with fee")?;
        let numerator = checked_mul(with_fee, output_reserve, "swap numerator")?;
        let denominator = checked_add(
            checked_mul(input_reserve, fee.denominator_u256(), "swap denominator")?,
            with_fee,
            "swap denominator",
        )?;

        Ok(numerator / denominator)
    }

    /// Calculate the input required to receive at least `output`
    ///
    /// Inverse of [`SwapMath::output_amount`], rounded up by one unit so the
    /// returned input always buys the requested output.
    pub fn input_amount(
        output: U256,
        input_reserve: U256,
        output_reserve: U256,
        fee: FeeRate,
    ) -> Result<U256> {
        if input_reserve.is_zero() || output_reserve.is_zero() {
            return Err(AmmError::InvalidPrecondition("reserves must be positive"));
        }
        if output >= output_reserve {
            return Err(AmmError::OutOfRange(
                "insufficient liquidity: output exceeds reserve",
            ));
        }
        if output.is_zero() {
            return Ok(U256::zero());
        }

        let numerator = checked_mul(
            checked_mul(input_reserve, output, "input numerator")?,
            fee.denominator_u256(),
            "input numerator",
        )?;
        let denominator = checked_mul(
            output_reserve - output,
            fee.numerator_u256(),
            "input denominator",
        )?;

        checked_add(numerator / denominator, U256::one(), "input amount")
    }

    /// Lowest acceptable output after allowing `slippage_bps` of movement
    pub fn minimum_output(expected: U256, slippage_bps: u32) -> Result<U256> {
        let slippage_bps = u64::from(slippage_bps);
        if slippage_bps > BPS_DENOMINATOR {
            return Err(AmmError::OutOfRange("slippage exceeds 100%"));
        }
        mul_div_floor(
            expected,
            U256::from(BPS_DENOMINATOR - slippage_bps),
            U256::from(BPS_DENOMINATOR),
            "minimum output",
        )
    }

    /// Price impact of a trade in basis points
    ///
    /// Compares the fee-free curve output with what the same input would buy
    /// at the current spot price. Zero when the spot output rounds to zero.
    pub fn price_impact_bps(
        input: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        let actual = Self::output_amount(input, input_reserve, output_reserve, FeeRate::ZERO)?;
        let spot = mul_div_floor(input, output_reserve, input_reserve, "spot output")?;

        if spot.is_zero() {
            return Ok(U256::zero());
        }

        mul_div_floor(
            spot.saturating_sub(actual),
            U256::from(BPS_DENOMINATOR),
            spot,
            "price impact",
        )
    }
}
