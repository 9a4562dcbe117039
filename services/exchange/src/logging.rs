//! Standardized emoji logging for the exchange client
//!
//! Keeps liquidity and swap logs scannable: one emoji per kind of event.

/// Standard emoji set for exchange logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Warning or caution

    // Module-specific
    pub const SEARCH: &'static str = "🔍"; // Reading chain state
    pub const CHART: &'static str = "📊"; // Quotes and reserves
    pub const NETWORK: &'static str = "🌐"; // Network/connection
    pub const CLOCK: &'static str = "⏱️"; // Waiting for confirmation

    // Event types
    pub const SWAP: &'static str = "🔄"; // Swap
    pub const MINT: &'static str = "➕"; // Liquidity add
    pub const BURN: &'static str = "➖"; // Liquidity remove
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_quote {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_swap {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SWAP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_mint {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MINT, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_burn {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BURN, format!($($arg)*))
    };
}
