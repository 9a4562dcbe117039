//! Liquidity controller
//!
//! Read reserves, quote with the exact math, then approve and deposit (or
//! burn LP) on the exchange. Each action takes its own fresh snapshot; a
//! pool that moved in between is caught by the contract's own checks.

use crate::chain::{execute, read_pool_snapshot, Asset, ChainClient, ConfirmedTx, ExchangeCall};
use crate::error::{ExchangeError, Result};
use crate::settings::ExchangeSettings;
use crate::wallet::{require_network, WalletSession};
use crate::{log_burn, log_mint, log_quote};
use diamond_amm::{AmmError, PoolSnapshot, RemovalAmounts, U256};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ether, DH and LP balances of one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub address: Address,
    pub ether: U256,
    pub token: U256,
    pub lp: U256,
}

/// What a deposit of a given ether amount requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddLiquidityQuote {
    /// Empty pool: the provider picks any token amount and sets the ratio
    Bootstrap { lp_minted: U256 },
    /// Existing pool: the token amount that keeps the ratio
    Proportional { token_required: U256, lp_minted: U256 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub approval: ConfirmedTx,
    pub deposit: ConfirmedTx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReceipt {
    /// Amounts quoted from the snapshot taken before the burn
    pub expected: RemovalAmounts,
    pub tx: ConfirmedTx,
}

pub struct LiquidityController<C, W> {
    chain: Arc<C>,
    wallet: Arc<W>,
    settings: ExchangeSettings,
}

impl<C, W> LiquidityController<C, W>
where
    C: ChainClient,
    W: WalletSession,
{
    pub fn new(chain: Arc<C>, wallet: Arc<W>, settings: ExchangeSettings) -> Self {
        Self {
            chain,
            wallet,
            settings,
        }
    }

    pub async fn pool_snapshot(&self) -> Result<PoolSnapshot> {
        read_pool_snapshot(self.chain.as_ref()).await
    }

    pub async fn account_balances(&self) -> Result<AccountBalances> {
        let address = self.wallet.active_address().await?;
        let (ether, token, lp) = tokio::try_join!(
            self.chain.read_balance(Asset::Ether, address),
            self.chain.read_balance(Asset::Token, address),
            self.chain.read_balance(Asset::LpToken, address),
        )?;

        Ok(AccountBalances {
            address,
            ether,
            token,
            lp,
        })
    }

    /// Quote a deposit of `ether_in` wei against the current pool
    pub async fn quote_add(&self, ether_in: U256) -> Result<AddLiquidityQuote> {
        let pool = self.pool_snapshot().await?;
        let quote = quote_add_for(&pool, ether_in)?;
        log_quote!("Add liquidity quote for {} wei: {:?}", ether_in, quote);
        Ok(quote)
    }

    /// Approve `token_amount` DH and deposit it with `ether_in` wei
    ///
    /// On an existing pool, `token_amount` must cover the ratio-preserving
    /// amount or the contract reverts; that is checked here first.
    pub async fn add_liquidity(&self, ether_in: U256, token_amount: U256) -> Result<DepositReceipt> {
        if ether_in.is_zero() {
            return Err(ExchangeError::ZeroAmount("ether deposit"));
        }
        if token_amount.is_zero() {
            return Err(ExchangeError::ZeroAmount("token deposit"));
        }

        let identity = require_network(self.wallet.as_ref(), self.settings.required_chain_id).await?;
        let balances = self.account_balances().await?;
        ensure_covered("ether", ether_in, balances.ether)?;
        ensure_covered("DH tokens", token_amount, balances.token)?;

        let pool = self.pool_snapshot().await?;
        if let AddLiquidityQuote::Proportional { token_required, .. } =
            quote_add_for(&pool, ether_in)?
        {
            if token_amount < token_required {
                return Err(AmmError::OutOfRange("token amount below the pool ratio").into());
            }
        }

        let approval = execute(
            self.chain.as_ref(),
            &identity,
            ExchangeCall::ApproveToken {
                amount: token_amount,
            },
        )
        .await?;

        let deposit = execute(
            self.chain.as_ref(),
            &identity,
            ExchangeCall::AddLiquidity {
                token_amount,
                value: ether_in,
            },
        )
        .await?;

        log_mint!(
            "Added liquidity: {} wei + {} DH (0x{:x})",
            ether_in,
            token_amount,
            deposit.hash
        );
        Ok(DepositReceipt { approval, deposit })
    }

    /// Ether and DH returned for burning `lp_amount`
    pub async fn quote_remove(&self, lp_amount: U256) -> Result<RemovalAmounts> {
        let pool = self.pool_snapshot().await?;
        let amounts = pool.removal_amounts(lp_amount)?;
        log_quote!(
            "Remove {} LP -> {} wei + {} DH",
            lp_amount,
            amounts.ether_out,
            amounts.token_out
        );
        Ok(amounts)
    }

    pub async fn remove_liquidity(&self, lp_amount: U256) -> Result<RemovalReceipt> {
        if lp_amount.is_zero() {
            return Err(ExchangeError::ZeroAmount("LP tokens"));
        }

        let identity = require_network(self.wallet.as_ref(), self.settings.required_chain_id).await?;
        let holder_lp = self
            .chain
            .read_balance(Asset::LpToken, identity.address)
            .await?;
        ensure_covered("LP tokens", lp_amount, holder_lp)?;

        let expected = self.pool_snapshot().await?.removal_amounts(lp_amount)?;
        let tx = execute(
            self.chain.as_ref(),
            &identity,
            ExchangeCall::RemoveLiquidity { lp_amount },
        )
        .await?;

        log_burn!(
            "Removed {} LP for ~{} wei + ~{} DH (0x{:x})",
            lp_amount,
            expected.ether_out,
            expected.token_out,
            tx.hash
        );
        Ok(RemovalReceipt { expected, tx })
    }
}

fn quote_add_for(pool: &PoolSnapshot, ether_in: U256) -> Result<AddLiquidityQuote> {
    let lp_minted = pool.lp_tokens_for_deposit(ether_in)?;
    if pool.is_uninitialized() {
        return Ok(AddLiquidityQuote::Bootstrap { lp_minted });
    }
    Ok(AddLiquidityQuote::Proportional {
        token_required: pool.paired_token_amount(ether_in)?,
        lp_minted,
    })
}

pub(crate) fn ensure_covered(what: &'static str, requested: U256, available: U256) -> Result<()> {
    if requested > available {
        return Err(ExchangeError::InsufficientBalance {
            what,
            requested,
            available,
        });
    }
    Ok(())
}
