//! # Ethers Chain Client - JSON-RPC Access to the Exchange
//!
//! ## Purpose
//!
//! [`ChainClient`] over an HTTP JSON-RPC endpoint. Reads go through the
//! exchange and token contracts (bindings generated with `abigen!` from
//! their human-readable ABIs); writes are signed locally with the
//! configured key and confirmed by polling for the receipt.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`ExchangeConfig`] (RPC URL, contract addresses, confirmation policy)
//! - **Output Destinations**: Liquidity and swap controllers
//! - **Failure Model**: RPC and contract errors become [`ExchangeError::Chain`];
//!   a receipt with status 0 is [`TxOutcome::Reverted`]; no receipt before the
//!   timeout is [`ExchangeError::ConfirmationTimeout`]. Nothing is retried.

use crate::chain::{Asset, ChainClient, ExchangeCall, TxHandle, TxOutcome};
use crate::error::{ExchangeError, Result};
use crate::logging::LogEmoji;
use crate::wallet::SigningIdentity;
use anyhow::Context;
use async_trait::async_trait;
use diamond_config::ExchangeConfig;
use ethers::abi::Detokenize;
use ethers::contract::ContractCall;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, U256, U64};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

mod bindings {
    pub mod exchange {
        ethers::contract::abigen!(
            ExchangeContract,
            r#"[
                function getReserve() public view returns (uint256)
                function balanceOf(address account) public view returns (uint256)
                function totalSupply() public view returns (uint256)
                function addLiquidity(uint256 _amount) public payable returns (uint256)
                function removeLiquidity(uint256 _amount) public returns (uint256, uint256)
                function getAmountOfTokens(uint256 inputAmount, uint256 inputReserve, uint256 outputReserve) public pure returns (uint256)
                function ethToDiamondHandsToken(uint256 _minTokens) public payable
                function diamondHandsTokenToEth(uint256 _tokensSold, uint256 _minEth) public
            ]"#
        );
    }

    pub mod token {
        ethers::contract::abigen!(
            TokenContract,
            r#"[
                function balanceOf(address account) public view returns (uint256)
                function approve(address spender, uint256 amount) public returns (bool)
            ]"#
        );
    }
}

use bindings::exchange::ExchangeContract;
use bindings::token::TokenContract;

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Receipt polling cadence
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Build an HTTP provider for `rpc_url`
pub fn connect_provider(rpc_url: &str) -> anyhow::Result<Arc<Provider<Http>>> {
    let url: Url = rpc_url.parse().context("Invalid RPC URL")?;
    let provider = Provider::new(Http::new(url)).interval(RECEIPT_POLL_INTERVAL);
    Ok(Arc::new(provider))
}

pub struct EthersChainClient {
    client: Arc<SignerClient>,
    exchange: ExchangeContract<SignerClient>,
    token: TokenContract<SignerClient>,
    exchange_address: Address,
    confirmations: usize,
    confirmation_timeout: Duration,
}

impl EthersChainClient {
    /// Bind the configured contracts to `provider`, signing with `wallet`
    pub fn new(
        config: &ExchangeConfig,
        provider: Arc<Provider<Http>>,
        wallet: LocalWallet,
    ) -> anyhow::Result<Self> {
        let exchange_address = config.exchange_address()?;
        let token_address = config.token_address()?;

        let wallet = wallet.with_chain_id(config.network.chain_id);
        let client = Arc::new(SignerMiddleware::new(provider.as_ref().clone(), wallet));

        info!(
            "{} Exchange client ready: rpc={} exchange={:?} token={:?}",
            LogEmoji::NETWORK,
            config.network.rpc_url,
            exchange_address,
            token_address
        );

        Ok(Self {
            exchange: ExchangeContract::new(exchange_address, client.clone()),
            token: TokenContract::new(token_address, client.clone()),
            client,
            exchange_address,
            confirmations: config.trading.confirmations.max(1),
            confirmation_timeout: Duration::from_secs(config.trading.confirmation_timeout_secs),
        })
    }

    fn call_for(&self, call: ExchangeCall) -> Pending {
        match call {
            ExchangeCall::ApproveToken { amount } => {
                Pending::Bool(self.token.approve(self.exchange_address, amount))
            }
            ExchangeCall::AddLiquidity {
                token_amount,
                value,
            } => Pending::Amount(self.exchange.add_liquidity(token_amount).value(value)),
            ExchangeCall::RemoveLiquidity { lp_amount } => {
                Pending::Pair(self.exchange.remove_liquidity(lp_amount))
            }
            ExchangeCall::EthToToken { min_tokens, value } => Pending::Unit(
                self.exchange
                    .eth_to_diamond_hands_token(min_tokens)
                    .value(value),
            ),
            ExchangeCall::TokenToEth {
                tokens_sold,
                min_eth,
            } => Pending::Unit(
                self.exchange
                    .diamond_hands_token_to_eth(tokens_sold, min_eth),
            ),
        }
    }

    async fn wait_for_receipt(&self, hash: H256) -> Result<TxOutcome> {
        loop {
            let receipt = self
                .client
                .get_transaction_receipt(hash)
                .await
                .map_err(ExchangeError::chain)?;

            if let Some(receipt) = receipt {
                let block = receipt.block_number.map(|b| b.as_u64());
                if let Some(mined_in) = block {
                    let head = self
                        .client
                        .get_block_number()
                        .await
                        .map_err(ExchangeError::chain)?
                        .as_u64();
                    if head + 1 >= mined_in + self.confirmations as u64 {
                        return Ok(match receipt.status {
                            Some(status) if status == U64::from(1) => {
                                TxOutcome::Confirmed { hash, block }
                            }
                            _ => TxOutcome::Reverted { hash },
                        });
                    }
                }
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

/// Contract calls differ only in their decoded return type
enum Pending {
    Unit(ContractCall<SignerClient, ()>),
    Bool(ContractCall<SignerClient, bool>),
    Amount(ContractCall<SignerClient, U256>),
    Pair(ContractCall<SignerClient, (U256, U256)>),
}

async fn broadcast<D>(call: ContractCall<SignerClient, D>) -> Result<H256>
where
    D: Detokenize + Send + Sync,
{
    let pending = call.send().await.map_err(ExchangeError::chain)?;
    Ok(pending.tx_hash())
}

#[async_trait]
impl ChainClient for EthersChainClient {
    fn exchange_address(&self) -> Address {
        self.exchange_address
    }

    async fn read_balance(&self, asset: Asset, holder: Address) -> Result<U256> {
        let balance = match asset {
            Asset::Ether => self
                .client
                .get_balance(holder, None)
                .await
                .map_err(ExchangeError::chain)?,
            Asset::Token => self
                .token
                .balance_of(holder)
                .call()
                .await
                .map_err(ExchangeError::chain)?,
            Asset::LpToken => self
                .exchange
                .balance_of(holder)
                .call()
                .await
                .map_err(ExchangeError::chain)?,
        };
        debug!("{:?} balance of {:?}: {}", asset, holder, balance);
        Ok(balance)
    }

    async fn read_reserve(&self) -> Result<U256> {
        self.exchange
            .get_reserve()
            .call()
            .await
            .map_err(ExchangeError::chain)
    }

    async fn read_total_supply(&self) -> Result<U256> {
        self.exchange
            .total_supply()
            .call()
            .await
            .map_err(ExchangeError::chain)
    }

    async fn read_amount_out(
        &self,
        input: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        self.exchange
            .get_amount_of_tokens(input, input_reserve, output_reserve)
            .call()
            .await
            .map_err(ExchangeError::chain)
    }

    async fn submit_transaction(
        &self,
        identity: &SigningIdentity,
        call: ExchangeCall,
    ) -> Result<TxHandle> {
        let signer = self.client.address();
        if identity.address != signer {
            return Err(ExchangeError::InvalidSigner {
                requested: identity.address,
                expected: signer,
            });
        }

        debug!("Broadcasting {:?}", call);
        let hash = match self.call_for(call) {
            Pending::Unit(c) => broadcast(c).await?,
            Pending::Bool(c) => broadcast(c).await?,
            Pending::Amount(c) => broadcast(c).await?,
            Pending::Pair(c) => broadcast(c).await?,
        };
        Ok(TxHandle { hash })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome> {
        timeout(self.confirmation_timeout, self.wait_for_receipt(handle.hash))
            .await
            .map_err(|_| ExchangeError::ConfirmationTimeout {
                hash: handle.hash,
                secs: self.confirmation_timeout.as_secs(),
            })?
    }
}
