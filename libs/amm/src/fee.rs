//! Input-side swap fee
//!
//! The exchange keeps `denominator - numerator` parts of every input as fee.
//! The deployed contract uses 99/100 (1%); the quote only matches on-chain
//! execution if these two numbers match the contract exactly.

use crate::error::{AmmError, Result};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Basis-point denominator used for slippage and price impact
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fraction of the input that reaches the curve (`numerator / denominator`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    pub numerator: u64,
    pub denominator: u64,
}

impl FeeRate {
    /// Fee charged by the deployed Diamond Hands exchange (1%)
    pub const EXCHANGE: FeeRate = FeeRate {
        numerator: 99,
        denominator: 100,
    };

    /// No fee; the bare constant-product curve
    pub const ZERO: FeeRate = FeeRate {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 || numerator == 0 {
            return Err(AmmError::InvalidPrecondition(
                "fee numerator and denominator must be positive",
            ));
        }
        if numerator > denominator {
            return Err(AmmError::OutOfRange("fee numerator exceeds denominator"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator_u256(&self) -> U256 {
        U256::from(self.numerator)
    }

    pub fn denominator_u256(&self) -> U256 {
        U256::from(self.denominator)
    }

    /// Fee expressed in basis points, rounded down (99/100 -> 100)
    pub fn fee_bps(&self) -> u64 {
        (self.denominator - self.numerator) * BPS_DENOMINATOR / self.denominator
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::EXCHANGE
    }
}
