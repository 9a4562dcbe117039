//! Deployment constants for the Diamond Hands exchange
//!
//! Values the contracts were deployed with. The fee must match the
//! exchange contract exactly or client quotes drift from execution.

/// Rinkeby, where the exchange is deployed
pub const DEFAULT_CHAIN_ID: u64 = 4;

/// Local node, used when nothing else is configured
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Placeholder until a deployment is configured
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Exchange fee: 99 of every 100 input units reach the curve
pub mod fee {
    pub const NUMERATOR: u64 = 99;
    pub const DENOMINATOR: u64 = 100;
}

/// Transaction defaults
pub mod trading {
    /// The quoted amount itself is sent as the minimum
    pub const DEFAULT_SLIPPAGE_BPS: u32 = 0;

    pub const DEFAULT_CONFIRMATIONS: usize = 1;

    pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

    /// Environment variable holding the signing key
    pub const DEFAULT_PRIVATE_KEY_ENV: &str = "DIAMOND_PRIVATE_KEY";
}
