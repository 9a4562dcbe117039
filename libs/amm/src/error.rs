//! Error types for exchange math
//!
//! Every failure is reported to the caller. Nothing is clamped or coerced
//! to zero, because a client-side estimate that silently differs from the
//! contract's arithmetic produces a transaction that reverts.

use thiserror::Error;

/// Errors produced by the AMM math functions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// A value that must be positive was zero (empty pool, zero LP supply, zero divisor)
    #[error("Invalid precondition: {0}")]
    InvalidPrecondition(&'static str),

    /// A requested amount exceeds what the pool or the supply can provide
    #[error("Out of range: {0}")]
    OutOfRange(&'static str),

    /// An intermediate product or sum does not fit in 256 bits
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, AmmError>;
