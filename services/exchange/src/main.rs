use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use diamond_amm::{SwapDirection, U256};
use diamond_config::ExchangeConfig;
use diamond_exchange::{
    connect_provider, AddLiquidityQuote, EthersChainClient, ExchangeSettings, LiquidityController,
    LocalWalletSession, SwapController,
};
use ethers::utils::{format_ether, parse_ether};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Add/remove liquidity and swap ether <-> DH on the Diamond Hands exchange
#[derive(Parser, Debug)]
#[command(name = "diamond", version)]
struct Cli {
    /// TOML config file; DIAMOND__* environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective configuration as TOML
    Config,
    /// Show exchange reserves and LP supply
    Pool,
    /// Show ether, DH and LP balances of the signing account
    Balances,
    /// DH required (and LP minted) for depositing ETHER
    QuoteAdd { ether: String },
    /// Deposit ETHER plus the ratio-preserving DH amount
    AddLiquidity {
        ether: String,
        /// DH to deposit; required while the pool is empty
        #[arg(long)]
        tokens: Option<String>,
    },
    /// Ether and DH returned for burning LP tokens
    QuoteRemove { lp: String },
    /// Burn LP tokens
    RemoveLiquidity { lp: String },
    /// Quote a swap
    QuoteSwap {
        amount: String,
        #[arg(long, value_enum)]
        sell: Sell,
    },
    /// Execute a swap
    Swap {
        amount: String,
        #[arg(long, value_enum)]
        sell: Sell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Sell {
    Eth,
    Dh,
}

impl From<Sell> for SwapDirection {
    fn from(sell: Sell) -> Self {
        match sell {
            Sell::Eth => SwapDirection::EthToToken,
            Sell::Dh => SwapDirection::TokenToEth,
        }
    }
}

type Liquidity = LiquidityController<EthersChainClient, LocalWalletSession>;
type Swaps = SwapController<EthersChainClient, LocalWalletSession>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ExchangeConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Only `config` runs without a validated deployment and signing key
    let open = || connect(&config);

    match cli.command {
        Command::Config => print!("{}", config.to_toml()?),
        Command::Pool => {
            let (liquidity, _) = open()?;
            let pool = liquidity.pool_snapshot().await?;
            println!("ether reserve: {} ETH", format_ether(pool.ether_reserve));
            println!("token reserve: {} DH", format_ether(pool.token_reserve));
            println!("LP supply:     {}", format_ether(pool.lp_supply));
            if pool.is_uninitialized() {
                println!("pool is empty: the first deposit sets the price");
            }
        }
        Command::Balances => {
            let (liquidity, _) = open()?;
            let balances = liquidity.account_balances().await?;
            println!("account: {:?}", balances.address);
            println!("ether:   {} ETH", format_ether(balances.ether));
            println!("DH:      {}", format_ether(balances.token));
            println!("LP:      {}", format_ether(balances.lp));
        }
        Command::QuoteAdd { ether } => {
            let (liquidity, _) = open()?;
            match liquidity.quote_add(amount(&ether)?).await? {
                AddLiquidityQuote::Bootstrap { lp_minted } => {
                    println!(
                        "pool is empty: choose any DH amount (mints {} LP)",
                        format_ether(lp_minted)
                    );
                }
                AddLiquidityQuote::Proportional {
                    token_required,
                    lp_minted,
                } => {
                    println!("DH required: {}", format_ether(token_required));
                    println!("LP minted:   {}", format_ether(lp_minted));
                }
            }
        }
        Command::AddLiquidity { ether, tokens } => {
            let (liquidity, _) = open()?;
            let ether_in = amount(&ether)?;
            let tokens = resolve_deposit_tokens(&liquidity, ether_in, tokens.as_deref()).await?;
            print_json(&liquidity.add_liquidity(ether_in, tokens).await?)?;
        }
        Command::QuoteRemove { lp } => {
            let (liquidity, _) = open()?;
            let out = liquidity.quote_remove(amount(&lp)?).await?;
            println!("ether out: {} ETH", format_ether(out.ether_out));
            println!("DH out:    {}", format_ether(out.token_out));
        }
        Command::RemoveLiquidity { lp } => {
            let (liquidity, _) = open()?;
            print_json(&liquidity.remove_liquidity(amount(&lp)?).await?)?;
        }
        Command::QuoteSwap { amount: input, sell } => {
            let (_, swaps) = open()?;
            let quote = swaps.quote(sell.into(), amount(&input)?).await?;
            println!("expected out: {}", format_ether(quote.expected_output));
            println!("minimum out:  {}", format_ether(quote.minimum_output));
            println!("price impact: {} bps", quote.price_impact_bps);
        }
        Command::Swap { amount: input, sell } => {
            let (_, swaps) = open()?;
            print_json(&swaps.swap(sell.into(), amount(&input)?).await?)?;
        }
    }

    Ok(())
}

/// Validate the deployment, load the signing key and build both controllers
fn connect(config: &ExchangeConfig) -> Result<(Liquidity, Swaps)> {
    config.validate().context("Invalid configuration")?;
    let provider = connect_provider(&config.network.rpc_url)?;
    let session = LocalWalletSession::from_env(&config.wallet.private_key_env, provider.clone())?;
    let chain = Arc::new(EthersChainClient::new(
        config,
        provider,
        session.wallet().clone(),
    )?);
    let wallet = Arc::new(session);
    let settings = ExchangeSettings::from_config(config)?;

    info!(
        "Required chain id: {}, fee {}/{}",
        settings.required_chain_id, settings.fee.numerator, settings.fee.denominator
    );
    Ok((
        LiquidityController::new(chain.clone(), wallet.clone(), settings),
        SwapController::new(chain, wallet, settings),
    ))
}

/// DH to deposit: explicit when given, the quoted ratio otherwise
async fn resolve_deposit_tokens(
    liquidity: &Liquidity,
    ether_in: U256,
    tokens: Option<&str>,
) -> Result<U256> {
    if let Some(tokens) = tokens {
        return amount(tokens);
    }
    match liquidity.quote_add(ether_in).await? {
        AddLiquidityQuote::Proportional { token_required, .. } => Ok(token_required),
        AddLiquidityQuote::Bootstrap { .. } => {
            bail!("pool is empty: pass --tokens to set the initial DH amount")
        }
    }
}

/// Decimal amount in 18-decimal units (ether, DH and LP all use 18)
fn amount(value: &str) -> Result<U256> {
    parse_ether(value).with_context(|| format!("Invalid amount: {}", value))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
