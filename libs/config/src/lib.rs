//! # Diamond Configuration
//!
//! Configuration loading and deployment constants for the exchange client.
//!
//! ## Usage
//!
//! ```no_run
//! use diamond_config::ExchangeConfig;
//!
//! let config = ExchangeConfig::load(None).unwrap();
//! config.validate().unwrap();
//! println!("exchange at {}", config.contracts.exchange);
//! ```

pub mod deployment;
pub mod exchange_config;

// Re-export commonly used types
pub use exchange_config::{
    ContractsConfig, ExchangeConfig, FeeConfig, LoggingConfig, NetworkConfig, TradingConfig,
    WalletConfig,
};
