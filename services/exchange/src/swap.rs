//! Swap controller
//!
//! Quotes ether/DH swaps with the exact math (optionally confirmed against
//! the contract's own `getAmountOfTokens`) and executes them with the quote
//! as the contract-enforced minimum.

use crate::chain::{execute, read_pool_snapshot, Asset, ChainClient, ConfirmedTx, ExchangeCall};
use crate::error::{ExchangeError, Result};
use crate::liquidity::ensure_covered;
use crate::settings::ExchangeSettings;
use crate::wallet::{require_network, WalletSession};
use crate::{log_quote, log_swap};
use diamond_amm::{PoolSnapshot, SwapDirection, SwapMath, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub input: U256,
    pub expected_output: U256,
    /// `expected_output` less the configured slippage; sent to the contract
    pub minimum_output: U256,
    pub price_impact_bps: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapReceipt {
    pub quote: SwapQuote,
    /// Token approval, only for DH -> ether
    pub approval: Option<ConfirmedTx>,
    pub tx: ConfirmedTx,
}

pub struct SwapController<C, W> {
    chain: Arc<C>,
    wallet: Arc<W>,
    settings: ExchangeSettings,
}

impl<C, W> SwapController<C, W>
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

    /// Quote selling `input` in `direction` against a fresh snapshot
    pub async fn quote(&self, direction: SwapDirection, input: U256) -> Result<SwapQuote> {
        let pool = read_pool_snapshot(self.chain.as_ref()).await?;
        let quote = quote_for(&pool, direction, input, &self.settings)?;

        if self.settings.verify_quotes {
            let (input_reserve, output_reserve) = pool.reserves_for(direction);
            let on_chain = self
                .chain
                .read_amount_out(input, input_reserve, output_reserve)
                .await?;
            if on_chain != quote.expected_output {
                warn!(
                    "Local quote {} differs from contract quote {}",
                    quote.expected_output, on_chain
                );
                return Err(ExchangeError::QuoteMismatch {
                    local: quote.expected_output,
                    on_chain,
                });
            }
        }

        log_quote!(
            "{:?}: {} in -> {} out (min {}, impact {} bps)",
            direction,
            quote.input,
            quote.expected_output,
            quote.minimum_output,
            quote.price_impact_bps
        );
        Ok(quote)
    }

    /// Sell `input` in `direction`
    ///
    /// DH -> ether needs an ERC20 approval first; ether -> DH pays the
    /// input as the transaction value.
    pub async fn swap(&self, direction: SwapDirection, input: U256) -> Result<SwapReceipt> {
        if input.is_zero() {
            return Err(ExchangeError::ZeroAmount("swap input"));
        }

        let identity = require_network(self.wallet.as_ref(), self.settings.required_chain_id).await?;
        let (asset, what) = match direction {
            SwapDirection::EthToToken => (Asset::Ether, "ether"),
            SwapDirection::TokenToEth => (Asset::Token, "DH tokens"),
        };
        let balance = self.chain.read_balance(asset, identity.address).await?;
        ensure_covered(what, input, balance)?;

        let quote = self.quote(direction, input).await?;
        if quote.expected_output.is_zero() {
            return Err(ExchangeError::ZeroAmount("swap output"));
        }

        let (approval, tx) = match direction {
            SwapDirection::EthToToken => {
                let tx = execute(
                    self.chain.as_ref(),
                    &identity,
                    ExchangeCall::EthToToken {
                        min_tokens: quote.minimum_output,
                        value: input,
                    },
                )
                .await?;
                (None, tx)
            }
            SwapDirection::TokenToEth => {
                let approval = execute(
                    self.chain.as_ref(),
                    &identity,
                    ExchangeCall::ApproveToken { amount: input },
                )
                .await?;
                let tx = execute(
                    self.chain.as_ref(),
                    &identity,
                    ExchangeCall::TokenToEth {
                        tokens_sold: input,
                        min_eth: quote.minimum_output,
                    },
                )
                .await?;
                (Some(approval), tx)
            }
        };

        log_swap!(
            "Swapped {:?}: {} in, >= {} out (0x{:x})",
            direction,
            input,
            quote.minimum_output,
            tx.hash
        );
        Ok(SwapReceipt {
            quote,
            approval,
            tx,
        })
    }
}

fn quote_for(
    pool: &PoolSnapshot,
    direction: SwapDirection,
    input: U256,
    settings: &ExchangeSettings,
) -> Result<SwapQuote> {
    let expected_output = pool.swap_output(direction, input, settings.fee)?;
    Ok(SwapQuote {
        direction,
        input,
        expected_output,
        minimum_output: SwapMath::minimum_output(expected_output, settings.slippage_bps)?,
        price_impact_bps: pool.price_impact_bps(direction, input)?,
    })
}
