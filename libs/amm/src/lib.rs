//! # Diamond AMM - Exact Exchange Mathematics
//!
//! ## Purpose
//!
//! Pure, deterministic math for the ether/DH constant-product exchange:
//! the token amount that must accompany an ether deposit, the reserves
//! returned for burning LP tokens, and the output of a swap after the
//! input-side fee. Results must match the exchange contract bit for bit,
//! otherwise a client-side estimate turns into a reverted transaction.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Reserve snapshots read by the exchange service just before use
//! - **Output Destinations**: Liquidity and swap controllers, CLI quotes
//! - **Precision**: `U256` integers in base units, truncating division (EVM semantics)
//! - **Validation**: Zero reserves and zero supply are errors, overflow is an error
//!
//! ## Architecture Role
//!
//! ```text
//! PoolSnapshot ──► LiquidityMath ──► paired amount / LP minted / removal amounts
//!      │
//!      └────────► SwapMath ──────► output / input / minimum output / price impact
//! ```
//!
//! The empty-pool bootstrap (first provider chooses the ratio) is a caller
//! decision: [`PoolSnapshot::is_uninitialized`] reports it and
//! [`LiquidityMath::paired_token_amount`] refuses it.

pub mod error;
pub mod fee;
pub mod liquidity_math;
pub mod math;
pub mod pool;
pub mod swap_math;

pub use error::AmmError;
pub use fee::{FeeRate, BPS_DENOMINATOR};
pub use liquidity_math::{LiquidityMath, RemovalAmounts};
pub use pool::{PoolSnapshot, SwapDirection};
pub use swap_math::SwapMath;

/// Common integer type for AMM calculations
pub use ethers_core::types::U256;
