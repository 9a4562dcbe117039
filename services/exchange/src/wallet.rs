//! Wallet Session capability
//!
//! Supplies the active account and its network. Writes must go through
//! [`require_network`], which refuses to hand out a signing identity while
//! the wallet sits on a chain other than the deployment's.

use crate::error::{ExchangeError, Result};
use crate::logging::LogEmoji;
use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization to sign for `address` on `chain_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningIdentity {
    pub address: Address,
    pub chain_id: u64,
}

#[async_trait]
pub trait WalletSession: Send + Sync {
    async fn active_address(&self) -> Result<Address>;

    async fn network_id(&self) -> Result<u64>;

    async fn request_signing_identity(&self) -> Result<SigningIdentity>;
}

/// Signing identity, but only on the required network
pub async fn require_network<W>(wallet: &W, required_chain_id: u64) -> Result<SigningIdentity>
where
    W: WalletSession + ?Sized,
{
    let actual = wallet.network_id().await?;
    if actual != required_chain_id {
        warn!(
            "{} Refusing write: wallet on chain {}, deployment on {}",
            LogEmoji::WARNING,
            actual,
            required_chain_id
        );
        return Err(ExchangeError::WrongNetwork {
            expected: required_chain_id,
            actual,
        });
    }

    let identity = wallet.request_signing_identity().await?;
    debug!("Signing as {:?} on chain {}", identity.address, identity.chain_id);
    Ok(identity)
}

/// Wallet session backed by a local private key
pub struct LocalWalletSession {
    wallet: LocalWallet,
    provider: Arc<Provider<Http>>,
}

impl LocalWalletSession {
    pub fn new(wallet: LocalWallet, provider: Arc<Provider<Http>>) -> Self {
        Self { wallet, provider }
    }

    /// Load the key from the environment variable named `var`
    pub fn from_env(var: &str, provider: Arc<Provider<Http>>) -> Result<Self> {
        let key = std::env::var(var).map_err(|_| ExchangeError::MissingKey(var.to_string()))?;
        let wallet = key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ExchangeError::InvalidKey {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::new(wallet, provider))
    }

    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }
}

#[async_trait]
impl WalletSession for LocalWalletSession {
    async fn active_address(&self) -> Result<Address> {
        Ok(self.wallet.address())
    }

    async fn network_id(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(ExchangeError::chain)?;
        Ok(chain_id.as_u64())
    }

    async fn request_signing_identity(&self) -> Result<SigningIdentity> {
        Ok(SigningIdentity {
            address: self.wallet.address(),
            chain_id: self.network_id().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethers_client::connect_provider;

    // Anvil's first development key
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn provider() -> Arc<Provider<Http>> {
        connect_provider("http://127.0.0.1:8545").unwrap()
    }

    #[test]
    fn test_unset_key_variable() {
        let err = LocalWalletSession::from_env("DIAMOND_TEST_UNSET_KEY", provider())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ExchangeError::MissingKey(ref var) if var == "DIAMOND_TEST_UNSET_KEY"
        ));
    }

    #[test]
    fn test_malformed_key() {
        std::env::set_var("DIAMOND_TEST_BAD_KEY", "not-a-key");
        let err = LocalWalletSession::from_env("DIAMOND_TEST_BAD_KEY", provider())
            .err()
            .unwrap();
        std::env::remove_var("DIAMOND_TEST_BAD_KEY");
        assert!(matches!(err, ExchangeError::InvalidKey { .. }));
    }

    #[test]
    fn test_key_loaded_from_env() {
        std::env::set_var("DIAMOND_TEST_DEV_KEY", format!(" {} ", DEV_KEY));
        let session = LocalWalletSession::from_env("DIAMOND_TEST_DEV_KEY", provider()).unwrap();
        std::env::remove_var("DIAMOND_TEST_DEV_KEY");
        assert_eq!(
            session.wallet().address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }
}
