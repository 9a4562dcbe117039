//! Checked 256-bit helpers
//!
//! The exchange contract computes on `uint256` and reverts on overflow.
//! These helpers do the same: checked multiply/add, truncating division.

use crate::error::{AmmError, Result};
use ethers_core::types::U256;

/// `a * b`, failing instead of wrapping
pub fn checked_mul(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_mul(b).ok_or(AmmError::Overflow(what))
}

/// `a + b`, failing instead of wrapping
pub fn checked_add(a: U256, b: U256, what: &'static str) -> Result<U256> {
    a.checked_add(b).ok_or(AmmError::Overflow(what))
}

/// `floor(a * b / c)` with the multiplication done first, as the contract does.
pub fn mul_div_floor(a: U256, b: U256, c: U256, what: &'static str) -> Result<U256> {
    if c.is_zero() {
        return Err(AmmError::InvalidPrecondition("division by zero"));
    }
    Ok(checked_mul(a, b, what)? / c)
}
