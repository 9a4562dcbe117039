//! Error types for the exchange client
//!
//! Network and transaction failures are always surfaced. A failed write is
//! never reported as a successful zero-amount operation.

use diamond_amm::{AmmError, U256};
use ethers::types::{Address, H256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Exchange math rejected the inputs
    #[error(transparent)]
    Math(#[from] AmmError),

    /// Wallet is connected to a different network than the deployment
    #[error("Wrong network: expected chain id {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// A write was requested with a zero amount
    #[error("Amount for {0} must be greater than zero")]
    ZeroAmount(&'static str),

    /// Requested amount exceeds what the holder owns
    #[error("Out of range: {what} {requested} exceeds balance {available}")]
    InsufficientBalance {
        what: &'static str,
        requested: U256,
        available: U256,
    },

    /// Local quote disagrees with the contract's own `getAmountOfTokens`
    #[error("Quote mismatch: local math gives {local}, contract gives {on_chain} (check fee constants)")]
    QuoteMismatch { local: U256, on_chain: U256 },

    /// Signing identity does not belong to the client submitting the call
    #[error("Signer {requested:?} is not the account this client signs for ({expected:?})")]
    InvalidSigner { requested: Address, expected: Address },

    /// RPC, ABI or wallet failure
    #[error("Chain error: {0}")]
    Chain(String),

    /// The environment variable meant to hold the signing key is unset
    #[error("Signing key variable {0} is not set")]
    MissingKey(String),

    #[error("Invalid signing key in {var}: {reason}")]
    InvalidKey { var: String, reason: String },

    #[error("Transaction 0x{0:x} reverted")]
    TransactionReverted(H256),

    #[error("Transaction 0x{hash:x} not confirmed after {secs}s")]
    ConfirmationTimeout { hash: H256, secs: u64 },
}

impl ExchangeError {
    pub fn chain(err: impl std::fmt::Display) -> Self {
        Self::Chain(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
