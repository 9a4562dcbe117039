//! # Diamond Exchange Client
//!
//! ## Purpose
//!
//! Liquidity and swap flows for the ether/DH exchange. Controllers read a
//! fresh pool snapshot, quote it with `diamond-amm`, and submit the matching
//! contract calls through two capabilities:
//!
//! - [`ChainClient`]: balances, reserves, LP supply, the contract's own
//!   quote, transaction submission and confirmation
//! - [`WalletSession`]: active account, network id and signing identity;
//!   writes only proceed on the configured chain
//!
//! ## Architecture Role
//!
//! ```text
//! CLI ──► LiquidityController ──┐            ┌──► EthersChainClient ──► JSON-RPC
//!     └─► SwapController ───────┼─ PoolSnapshot ─► diamond-amm math
//!                               └─ require_network ◄── WalletSession
//! ```

pub mod chain;
pub mod error;
pub mod ethers_client;
pub mod liquidity;
pub mod logging;
pub mod settings;
pub mod swap;
pub mod wallet;

pub use chain::{
    read_pool_snapshot, Asset, ChainClient, ConfirmedTx, ExchangeCall, TxHandle, TxOutcome,
};
pub use error::{ExchangeError, Result};
pub use ethers_client::{connect_provider, EthersChainClient};
pub use liquidity::{
    AccountBalances, AddLiquidityQuote, DepositReceipt, LiquidityController, RemovalReceipt,
};
pub use settings::ExchangeSettings;
pub use swap::{SwapController, SwapQuote, SwapReceipt};
pub use wallet::{require_network, LocalWalletSession, SigningIdentity, WalletSession};
