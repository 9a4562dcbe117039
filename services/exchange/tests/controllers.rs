//! Liquidity and swap flows against an in-memory exchange
//!
//! `MockExchange` applies each write the way the exchange contract does and
//! records every submitted call, so the tests can check both the outcome
//! and that nothing was sent when a flow is refused.

use async_trait::async_trait;
use diamond_amm::{AmmError, FeeRate, PoolSnapshot, SwapDirection, U256};
use diamond_exchange::{
    AddLiquidityQuote, Asset, ChainClient, ExchangeCall, ExchangeError, ExchangeSettings,
    LiquidityController, Result, SigningIdentity, SwapController, TxHandle, TxOutcome,
    WalletSession,
};
use ethers::types::{Address, H256};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const RINKEBY: u64 = 4;

#[derive(Default)]
struct ExchangeState {
    pool: PoolSnapshot,
    balances: HashMap<(Asset, Address), U256>,
    allowance: U256,
    calls: Vec<ExchangeCall>,
    outcomes: HashMap<H256, TxOutcome>,
    nonce: u64,
    revert_on: Option<&'static str>,
    contract_quote: Option<U256>,
}

struct MockExchange {
    address: Address,
    state: Mutex<ExchangeState>,
}

impl MockExchange {
    fn new(pool: PoolSnapshot) -> Self {
        Self {
            address: Address::from_low_u64_be(0xe5),
            state: Mutex::new(ExchangeState {
                pool,
                ..Default::default()
            }),
        }
    }

    fn fund(&self, asset: Asset, holder: Address, amount: u64) {
        self.state
            .lock()
            .balances
            .insert((asset, holder), U256::from(amount));
    }

    fn revert_on(&self, call: &'static str) {
        self.state.lock().revert_on = Some(call);
    }

    fn set_contract_quote(&self, amount: u64) {
        self.state.lock().contract_quote = Some(U256::from(amount));
    }

    fn calls(&self) -> Vec<ExchangeCall> {
        self.state.lock().calls.clone()
    }

    fn pool(&self) -> PoolSnapshot {
        self.state.lock().pool
    }

    fn balance(&self, asset: Asset, holder: Address) -> U256 {
        self.state
            .lock()
            .balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }
}

impl ExchangeState {
    fn balance_mut(&mut self, asset: Asset, holder: Address) -> &mut U256 {
        self.balances.entry((asset, holder)).or_default()
    }

    /// Contract semantics of each write; `false` means the call reverts
    fn apply(&mut self, from: Address, call: &ExchangeCall) -> bool {
        match *call {
            ExchangeCall::ApproveToken { amount } => {
                self.allowance = amount;
                true
            }
            ExchangeCall::AddLiquidity {
                token_amount,
                value,
            } => {
                let taken = if self.pool.is_uninitialized() {
                    token_amount
                } else {
                    match self.pool.paired_token_amount(value) {
                        Ok(required) if required <= token_amount => required,
                        _ => return false,
                    }
                };
                if taken > self.allowance {
                    return false;
                }
                let minted = match self.pool.lp_tokens_for_deposit(value) {
                    Ok(minted) => minted,
                    Err(_) => return false,
                };
                self.allowance -= taken;
                self.pool.ether_reserve += value;
                self.pool.token_reserve += taken;
                self.pool.lp_supply += minted;
                *self.balance_mut(Asset::Ether, from) -= value;
                *self.balance_mut(Asset::Token, from) -= taken;
                *self.balance_mut(Asset::LpToken, from) += minted;
                true
            }
            ExchangeCall::RemoveLiquidity { lp_amount } => {
                let out = match self.pool.removal_amounts(lp_amount) {
                    Ok(out) => out,
                    Err(_) => return false,
                };
                self.pool.ether_reserve -= out.ether_out;
                self.pool.token_reserve -= out.token_out;
                self.pool.lp_supply -= lp_amount;
                *self.balance_mut(Asset::LpToken, from) -= lp_amount;
                *self.balance_mut(Asset::Ether, from) += out.ether_out;
                *self.balance_mut(Asset::Token, from) += out.token_out;
                true
            }
            ExchangeCall::EthToToken { min_tokens, value } => {
                let out = match self
                    .pool
                    .swap_output(SwapDirection::EthToToken, value, FeeRate::EXCHANGE)
                {
                    Ok(out) if out >= min_tokens => out,
                    _ => return false,
                };
                self.pool.ether_reserve += value;
                self.pool.token_reserve -= out;
                *self.balance_mut(Asset::Ether, from) -= value;
                *self.balance_mut(Asset::Token, from) += out;
                true
            }
            ExchangeCall::TokenToEth {
                tokens_sold,
                min_eth,
            } => {
                if tokens_sold > self.allowance {
                    return false;
                }
                let out = match self.pool.swap_output(
                    SwapDirection::TokenToEth,
                    tokens_sold,
                    FeeRate::EXCHANGE,
                ) {
                    Ok(out) if out >= min_eth => out,
                    _ => return false,
                };
                self.allowance -= tokens_sold;
                self.pool.token_reserve += tokens_sold;
                self.pool.ether_reserve -= out;
                *self.balance_mut(Asset::Token, from) -= tokens_sold;
                *self.balance_mut(Asset::Ether, from) += out;
                true
            }
        }
    }
}

#[async_trait]
impl ChainClient for MockExchange {
    fn exchange_address(&self) -> Address {
        self.address
    }

    async fn read_balance(&self, asset: Asset, holder: Address) -> Result<U256> {
        if asset == Asset::Ether && holder == self.address {
            return Ok(self.state.lock().pool.ether_reserve);
        }
        Ok(self.balance(asset, holder))
    }

    async fn read_reserve(&self) -> Result<U256> {
        Ok(self.state.lock().pool.token_reserve)
    }

    async fn read_total_supply(&self) -> Result<U256> {
        Ok(self.state.lock().pool.lp_supply)
    }

    async fn read_amount_out(
        &self,
        input: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        if let Some(quote) = self.state.lock().contract_quote {
            return Ok(quote);
        }
        Ok(diamond_amm::SwapMath::output_amount(
            input,
            input_reserve,
            output_reserve,
            FeeRate::EXCHANGE,
        )?)
    }

    async fn submit_transaction(
        &self,
        identity: &SigningIdentity,
        call: ExchangeCall,
    ) -> Result<TxHandle> {
        let mut state = self.state.lock();
        state.nonce += 1;
        let hash = H256::from_low_u64_be(state.nonce);

        let reverts = state.revert_on == Some(call.name());
        let outcome = if !reverts && state.apply(identity.address, &call) {
            TxOutcome::Confirmed {
                hash,
                block: Some(state.nonce),
            }
        } else {
            TxOutcome::Reverted { hash }
        };

        state.outcomes.insert(hash, outcome);
        state.calls.push(call);
        Ok(TxHandle { hash })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<TxOutcome> {
        self.state
            .lock()
            .outcomes
            .get(&handle.hash)
            .copied()
            .ok_or_else(|| ExchangeError::Chain(format!("unknown tx 0x{:x}", handle.hash)))
    }
}

struct MockWallet {
    address: Address,
    chain_id: AtomicU64,
}

impl MockWallet {
    fn on_chain(chain_id: u64) -> Self {
        Self {
            address: Address::from_low_u64_be(0xa11ce),
            chain_id: AtomicU64::new(chain_id),
        }
    }

    fn switch_network(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletSession for MockWallet {
    async fn active_address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn network_id(&self) -> Result<u64> {
        Ok(self.chain_id.load(Ordering::SeqCst))
    }

    async fn request_signing_identity(&self) -> Result<SigningIdentity> {
        Ok(SigningIdentity {
            address: self.address,
            chain_id: self.network_id().await?,
        })
    }
}

fn pool(ether: u64, token: u64, lp: u64) -> PoolSnapshot {
    PoolSnapshot::new(U256::from(ether), U256::from(token), U256::from(lp))
}

fn setup(pool: PoolSnapshot) -> (Arc<MockExchange>, Arc<MockWallet>) {
    let exchange = Arc::new(MockExchange::new(pool));
    let wallet = Arc::new(MockWallet::on_chain(RINKEBY));
    exchange.fund(Asset::Ether, wallet.address, 10_000);
    exchange.fund(Asset::Token, wallet.address, 10_000);
    (exchange, wallet)
}

fn liquidity(
    exchange: &Arc<MockExchange>,
    wallet: &Arc<MockWallet>,
) -> LiquidityController<MockExchange, MockWallet> {
    LiquidityController::new(exchange.clone(), wallet.clone(), ExchangeSettings::default())
}

fn swaps(
    exchange: &Arc<MockExchange>,
    wallet: &Arc<MockWallet>,
    settings: ExchangeSettings,
) -> SwapController<MockExchange, MockWallet> {
    SwapController::new(exchange.clone(), wallet.clone(), settings)
}

#[tokio::test]
async fn test_add_liquidity_approves_then_deposits() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    let controller = liquidity(&exchange, &wallet);

    let quote = controller.quote_add(U256::from(100)).await.unwrap();
    assert_eq!(
        quote,
        AddLiquidityQuote::Proportional {
            token_required: U256::from(200),
            lp_minted: U256::from(100),
        }
    );

    let receipt = controller
        .add_liquidity(U256::from(100), U256::from(200))
        .await
        .unwrap();
    assert_ne!(receipt.approval.hash, receipt.deposit.hash);

    assert_eq!(
        exchange.calls(),
        vec![
            ExchangeCall::ApproveToken {
                amount: U256::from(200)
            },
            ExchangeCall::AddLiquidity {
                token_amount: U256::from(200),
                value: U256::from(100),
            },
        ]
    );
    assert_eq!(exchange.pool(), pool(1100, 2200, 1100));
    assert_eq!(
        exchange.balance(Asset::LpToken, wallet.address),
        U256::from(100)
    );
}

#[tokio::test]
async fn test_first_deposit_sets_the_ratio() {
    let (exchange, wallet) = setup(PoolSnapshot::default());
    let controller = liquidity(&exchange, &wallet);

    assert_eq!(
        controller.quote_add(U256::from(1000)).await.unwrap(),
        AddLiquidityQuote::Bootstrap {
            lp_minted: U256::from(1000)
        }
    );

    controller
        .add_liquidity(U256::from(1000), U256::from(5000))
        .await
        .unwrap();
    assert_eq!(exchange.pool(), pool(1000, 5000, 1000));

    // The pool now quotes at the ratio the first provider chose
    let next = controller.quote_add(U256::from(10)).await.unwrap();
    assert_eq!(
        next,
        AddLiquidityQuote::Proportional {
            token_required: U256::from(50),
            lp_minted: U256::from(10),
        }
    );
}

#[tokio::test]
async fn test_deposit_below_ratio_is_not_submitted() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    let controller = liquidity(&exchange, &wallet);

    let err = controller
        .add_liquidity(U256::from(100), U256::from(150))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Math(AmmError::OutOfRange(_))));
    assert!(exchange.calls().is_empty());
}

#[tokio::test]
async fn test_deposit_beyond_balance_is_not_submitted() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    let controller = liquidity(&exchange, &wallet);

    let err = controller
        .add_liquidity(U256::from(20_000), U256::from(40_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::InsufficientBalance { what: "ether", .. }
    ));
    assert!(exchange.calls().is_empty());
}

#[tokio::test]
async fn test_writes_refused_on_wrong_network() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    exchange.fund(Asset::LpToken, wallet.address, 100);
    wallet.switch_network(1);

    let liquidity = liquidity(&exchange, &wallet);
    let swaps = swaps(&exchange, &wallet, ExchangeSettings::default());

    let wrong_network = |err: ExchangeError| {
        matches!(
            err,
            ExchangeError::WrongNetwork {
                expected: RINKEBY,
                actual: 1
            }
        )
    };

    assert!(wrong_network(
        liquidity
            .add_liquidity(U256::from(100), U256::from(100))
            .await
            .unwrap_err()
    ));
    assert!(wrong_network(
        liquidity.remove_liquidity(U256::from(10)).await.unwrap_err()
    ));
    assert!(wrong_network(
        swaps
            .swap(SwapDirection::EthToToken, U256::from(100))
            .await
            .unwrap_err()
    ));
    assert!(exchange.calls().is_empty());

    // Reads and quotes do not need the right network
    assert!(liquidity.quote_remove(U256::from(10)).await.is_ok());
    assert!(swaps
        .quote(SwapDirection::TokenToEth, U256::from(100))
        .await
        .is_ok());

    wallet.switch_network(RINKEBY);
    assert!(liquidity.remove_liquidity(U256::from(10)).await.is_ok());
}

#[tokio::test]
async fn test_remove_liquidity_returns_pro_rata_share() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    exchange.fund(Asset::LpToken, wallet.address, 100);
    let controller = liquidity(&exchange, &wallet);

    let quoted = controller.quote_remove(U256::from(100)).await.unwrap();
    assert_eq!(quoted.ether_out, U256::from(100));
    assert_eq!(quoted.token_out, U256::from(200));

    let receipt = controller.remove_liquidity(U256::from(100)).await.unwrap();
    assert_eq!(receipt.expected, quoted);
    assert_eq!(
        exchange.calls(),
        vec![ExchangeCall::RemoveLiquidity {
            lp_amount: U256::from(100)
        }]
    );
    assert_eq!(exchange.pool(), pool(900, 1800, 900));
    assert_eq!(
        exchange.balance(Asset::LpToken, wallet.address),
        U256::zero()
    );
}

#[tokio::test]
async fn test_remove_more_than_held_is_refused() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    exchange.fund(Asset::LpToken, wallet.address, 100);
    let controller = liquidity(&exchange, &wallet);

    let err = controller
        .remove_liquidity(U256::from(101))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::InsufficientBalance {
            what: "LP tokens",
            ..
        }
    ));
    assert!(exchange.calls().is_empty());
}

#[tokio::test]
async fn test_quote_remove_more_than_supply() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    let controller = liquidity(&exchange, &wallet);

    let err = controller.quote_remove(U256::from(1001)).await.unwrap_err();
    assert!(matches!(err, ExchangeError::Math(AmmError::OutOfRange(_))));
}

#[tokio::test]
async fn test_swap_ether_for_tokens_needs_no_approval() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    let controller = swaps(&exchange, &wallet, ExchangeSettings::default());

    let receipt = controller
        .swap(SwapDirection::EthToToken, U256::from(100))
        .await
        .unwrap();

    assert_eq!(receipt.quote.expected_output, U256::from(90));
    assert_eq!(receipt.quote.minimum_output, U256::from(90));
    assert!(receipt.approval.is_none());
    assert_eq!(
        exchange.calls(),
        vec![ExchangeCall::EthToToken {
            min_tokens: U256::from(90),
            value: U256::from(100),
        }]
    );
    assert_eq!(exchange.pool(), pool(1100, 910, 1000));
    assert_eq!(
        exchange.balance(Asset::Token, wallet.address),
        U256::from(10_090)
    );
}

#[tokio::test]
async fn test_swap_tokens_for_ether_approves_first() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    let settings = ExchangeSettings {
        slippage_bps: 100,
        ..ExchangeSettings::default()
    };
    let controller = swaps(&exchange, &wallet, settings);

    let receipt = controller
        .swap(SwapDirection::TokenToEth, U256::from(100))
        .await
        .unwrap();

    assert!(receipt.approval.is_some());
    assert_eq!(
        exchange.calls(),
        vec![
            ExchangeCall::ApproveToken {
                amount: U256::from(100)
            },
            ExchangeCall::TokenToEth {
                tokens_sold: U256::from(100),
                min_eth: U256::from(89),
            },
        ]
    );
    assert_eq!(exchange.pool(), pool(910, 1100, 1000));
}

#[tokio::test]
async fn test_quote_mismatch_blocks_swap() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    exchange.set_contract_quote(91);
    let controller = swaps(&exchange, &wallet, ExchangeSettings::default());

    let err = controller
        .swap(SwapDirection::EthToToken, U256::from(100))
        .await
        .unwrap_err();
    match err {
        ExchangeError::QuoteMismatch { local, on_chain } => {
            assert_eq!(local, U256::from(90));
            assert_eq!(on_chain, U256::from(91));
        }
        other => panic!("expected quote mismatch, got {other:?}"),
    }
    assert!(exchange.calls().is_empty());

    let unchecked = swaps(
        &exchange,
        &wallet,
        ExchangeSettings {
            verify_quotes: false,
            ..ExchangeSettings::default()
        },
    );
    let quote = unchecked
        .quote(SwapDirection::EthToToken, U256::from(100))
        .await
        .unwrap();
    assert_eq!(quote.expected_output, U256::from(90));
}

#[tokio::test]
async fn test_reverted_swap_is_an_error() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    exchange.revert_on("ethToDiamondHandsToken");
    let controller = swaps(&exchange, &wallet, ExchangeSettings::default());

    let err = controller
        .swap(SwapDirection::EthToToken, U256::from(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::TransactionReverted(_)));
    assert_eq!(exchange.pool(), pool(1000, 1000, 1000));
}

#[tokio::test]
async fn test_reverted_approval_stops_deposit() {
    let (exchange, wallet) = setup(pool(1000, 2000, 1000));
    exchange.revert_on("approve");
    let controller = liquidity(&exchange, &wallet);

    let err = controller
        .add_liquidity(U256::from(100), U256::from(200))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::TransactionReverted(_)));
    assert_eq!(exchange.calls().len(), 1);
}

#[tokio::test]
async fn test_zero_amounts_rejected() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    let liquidity = liquidity(&exchange, &wallet);
    let swaps = swaps(&exchange, &wallet, ExchangeSettings::default());

    assert!(matches!(
        swaps
            .swap(SwapDirection::TokenToEth, U256::zero())
            .await
            .unwrap_err(),
        ExchangeError::ZeroAmount(_)
    ));
    assert!(matches!(
        liquidity
            .add_liquidity(U256::zero(), U256::from(10))
            .await
            .unwrap_err(),
        ExchangeError::ZeroAmount(_)
    ));
    assert!(matches!(
        liquidity.remove_liquidity(U256::zero()).await.unwrap_err(),
        ExchangeError::ZeroAmount(_)
    ));

    // Too small to clear rounding: quoted, but never sent
    assert!(matches!(
        swaps
            .swap(SwapDirection::EthToToken, U256::one())
            .await
            .unwrap_err(),
        ExchangeError::ZeroAmount("swap output")
    ));
    assert!(exchange.calls().is_empty());
}

#[tokio::test]
async fn test_account_balances() {
    let (exchange, wallet) = setup(pool(1000, 1000, 1000));
    exchange.fund(Asset::LpToken, wallet.address, 7);
    let controller = liquidity(&exchange, &wallet);

    let balances = controller.account_balances().await.unwrap();
    assert_eq!(balances.address, wallet.address);
    assert_eq!(balances.ether, U256::from(10_000));
    assert_eq!(balances.token, U256::from(10_000));
    assert_eq!(balances.lp, U256::from(7));
}
