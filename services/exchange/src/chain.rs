//! Chain Client capability
//!
//! Everything the controllers need from the blockchain: balance and reserve
//! reads, the contract's own swap quote, and transaction submission with
//! confirmation. The ethers-backed implementation lives in
//! [`crate::ethers_client`]; tests use an in-memory pool.

use crate::error::{ExchangeError, Result};
use crate::logging::LogEmoji;
use crate::wallet::SigningIdentity;
use async_trait::async_trait;
use diamond_amm::{PoolSnapshot, U256};
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Balances the exchange client reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// Native currency, in wei
    Ether,
    /// Diamond Hands ERC20 token
    Token,
    /// Exchange LP token
    LpToken,
}

/// Contract writes issued by the liquidity and swap flows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExchangeCall {
    /// `token.approve(exchange, amount)`
    ApproveToken { amount: U256 },
    /// `exchange.addLiquidity(token_amount)` paying `value` wei
    AddLiquidity { token_amount: U256, value: U256 },
    /// `exchange.removeLiquidity(lp_amount)`
    RemoveLiquidity { lp_amount: U256 },
    /// `exchange.ethToDiamondHandsToken(min_tokens)` paying `value` wei
    EthToToken { min_tokens: U256, value: U256 },
    /// `exchange.diamondHandsTokenToEth(tokens_sold, min_eth)`
    TokenToEth { tokens_sold: U256, min_eth: U256 },
}

impl ExchangeCall {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApproveToken { .. } => "approve",
            Self::AddLiquidity { .. } => "addLiquidity",
            Self::RemoveLiquidity { .. } => "removeLiquidity",
            Self::EthToToken { .. } => "ethToDiamondHandsToken",
            Self::TokenToEth { .. } => "diamondHandsTokenToEth",
        }
    }
}

/// Submitted, not yet confirmed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: H256,
}

/// Final state of a confirmed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutcome {
    Confirmed { hash: H256, block: Option<u64> },
    Reverted { hash: H256 },
}

/// A transaction that made it into a block without reverting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedTx {
    pub hash: H256,
    pub block: Option<u64>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the exchange contract (holds the ether reserve)
    fn exchange_address(&self) -> Address;

    async fn read_balance(&self, asset: Asset, holder: Address) -> Result<U256>;

    /// DH tokens held by the exchange
    async fn read_reserve(&self) -> Result<U256>;

    /// Total LP supply
    async fn read_total_supply(&self) -> Result<U256>;

    /// The contract's `getAmountOfTokens` for the same arguments
    async fn read_amount_out(
        &self,
        input: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256>;

    async fn submit_transaction(
        &self,
        identity: &SigningIdentity,
        call: ExchangeCall,
    ) -> Result<TxHandle>;

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome>;
}

/// Read the exchange reserves and LP supply in one go
///
/// The ether reserve is the exchange contract's ether balance.
pub async fn read_pool_snapshot<C>(chain: &C) -> Result<PoolSnapshot>
where
    C: ChainClient + ?Sized,
{
    let (ether_reserve, token_reserve, lp_supply) = tokio::try_join!(
        chain.read_balance(Asset::Ether, chain.exchange_address()),
        chain.read_reserve(),
        chain.read_total_supply(),
    )?;

    debug!(
        "{} Pool snapshot: ether={} token={} lp={}",
        LogEmoji::SEARCH,
        ether_reserve,
        token_reserve,
        lp_supply
    );
    Ok(PoolSnapshot::new(ether_reserve, token_reserve, lp_supply))
}

/// Submit `call`, wait for it, and fail unless it confirmed
pub async fn execute<C>(
    chain: &C,
    identity: &SigningIdentity,
    call: ExchangeCall,
) -> Result<ConfirmedTx>
where
    C: ChainClient + ?Sized,
{
    let name = call.name();
    let handle = chain.submit_transaction(identity, call).await?;
    info!("{} Submitted {}: 0x{:x}", LogEmoji::CLOCK, name, handle.hash);

    match chain.await_confirmation(&handle).await? {
        TxOutcome::Confirmed { hash, block } => {
            crate::log_success!("{} confirmed in block {:?}: 0x{:x}", name, block, hash);
            Ok(ConfirmedTx { hash, block })
        }
        TxOutcome::Reverted { hash } => {
            crate::log_error!("{} reverted: 0x{:x}", name, hash);
            Err(ExchangeError::TransactionReverted(hash))
        }
    }
}
