//! Wallet connection and the session it produces.

use alloy_primitives::{Address, U64};
use cd_api_types::ChainId;
use cd_chain_client::{ChainError, Eip1193Provider};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::rc::Rc;
use tracing::{debug, info};

/// Read access to the injected provider. Every request goes through here so
/// provider failures map to [`ChainError`] in one place.
#[derive(Clone)]
pub struct ProviderHandle {
    provider: Rc<dyn Eip1193Provider>,
}

impl ProviderHandle {
    pub fn new(provider: Rc<dyn Eip1193Provider>) -> Self {
        Self { provider }
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ChainError> {
        debug!(method, "wallet request");
        self.provider
            .request(method, params)
            .await
            .map_err(|err| ChainError::from_provider(method, err))
    }

    pub async fn chain_id(&self) -> Result<ChainId, ChainError> {
        let quantity: U64 = self.request_as("eth_chainId").await?;
        Ok(ChainId(quantity.to::<u64>()))
    }

    pub async fn accounts(&self, method: &str) -> Result<Vec<Address>, ChainError> {
        self.request_as(method).await
    }

    async fn request_as<T: DeserializeOwned>(&self, method: &str) -> Result<T, ChainError> {
        let raw = self.request(method, json!([])).await?;
        serde_json::from_value(raw).map_err(|err| ChainError::call(method, format!("unexpected response: {err}")))
    }
}

/// A provider handle able to authorize writes from `address`.
#[derive(Clone)]
pub struct SignerHandle {
    provider: ProviderHandle,
    address: Address,
}

impl SignerHandle {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn provider(&self) -> &ProviderHandle {
        &self.provider
    }
}

pub struct WalletConnector {
    provider: ProviderHandle,
    required_chain: ChainId,
}

impl WalletConnector {
    pub fn new(provider: Rc<dyn Eip1193Provider>, required_chain: ChainId) -> Self {
        Self {
            provider: ProviderHandle::new(provider),
            required_chain,
        }
    }

    /// Ask the wallet for account access, then check the network.
    ///
    /// The wallet only prompts the first time; later calls resolve with the
    /// already-authorized accounts.
    pub async fn connect(&self) -> Result<WalletSession, ChainError> {
        let accounts = self.provider.accounts("eth_requestAccounts").await?;
        let address = accounts.first().copied().ok_or(ChainError::NoAccount)?;

        let session = WalletSession {
            provider: self.provider.clone(),
            required_chain: self.required_chain,
        };
        session.ensure_network().await?;

        info!(%address, chain = %self.required_chain, "wallet connected");
        Ok(session)
    }
}

/// An authorized wallet. Network and account are re-read on every use, the
/// user can switch either at any time.
#[derive(Clone)]
pub struct WalletSession {
    provider: ProviderHandle,
    required_chain: ChainId,
}

impl WalletSession {
    pub async fn ensure_network(&self) -> Result<(), ChainError> {
        let actual = self.provider.chain_id().await?;
        if actual != self.required_chain {
            return Err(ChainError::WrongNetwork {
                expected: self.required_chain,
                actual,
            });
        }
        Ok(())
    }

    pub async fn provider(&self) -> Result<ProviderHandle, ChainError> {
        self.ensure_network().await?;
        Ok(self.provider.clone())
    }

    /// Signer for the wallet's current account, read without prompting.
    pub async fn signer(&self) -> Result<SignerHandle, ChainError> {
        self.ensure_network().await?;

        let accounts = self.provider.accounts("eth_accounts").await?;
        let address = accounts.first().copied().ok_or(ChainError::NoAccount)?;

        Ok(SignerHandle {
            provider: self.provider.clone(),
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryChain;
    use alloy_primitives::address;

    const ALICE: Address = address!("00000000000000000000000000000000000a11ce");

    fn connector(chain: &Rc<InMemoryChain>) -> WalletConnector {
        WalletConnector::new(chain.clone(), ChainId(4))
    }

    #[tokio::test]
    async fn connect_returns_session_for_first_account() {
        let chain = Rc::new(InMemoryChain::new(ALICE));
        let session = connector(&chain).connect().await.unwrap();

        assert_eq!(session.signer().await.unwrap().address(), ALICE);
    }

    #[tokio::test]
    async fn connect_fails_on_wrong_network() {
        let chain = Rc::new(InMemoryChain::new(ALICE));
        chain.with_state(|s| s.chain_id = ChainId(1));

        let err = connector(&chain).connect().await.err().unwrap();
        assert_eq!(
            err,
            ChainError::WrongNetwork {
                expected: ChainId(4),
                actual: ChainId(1),
            }
        );
    }

    #[tokio::test]
    async fn malformed_chain_id_is_a_chain_call_error() {
        struct BadChainId;

        #[async_trait::async_trait(?Send)]
        impl Eip1193Provider for BadChainId {
            async fn request(&self, _method: &str, _params: Value) -> Result<Value, cd_chain_client::ProviderError> {
                Ok(json!("rinkeby"))
            }
        }

        let handle = ProviderHandle::new(Rc::new(BadChainId));
        assert!(matches!(
            handle.chain_id().await,
            Err(ChainError::ChainCall { method, .. }) if method == "eth_chainId"
        ));
    }

    #[tokio::test]
    async fn connect_maps_rejection() {
        let chain = Rc::new(InMemoryChain::new(ALICE));
        chain.with_state(|s| s.reject_connect = true);

        let err = connector(&chain).connect().await.err().unwrap();
        assert_eq!(err, ChainError::UserRejected);
    }

    #[tokio::test]
    async fn session_notices_network_switch() {
        let chain = Rc::new(InMemoryChain::new(ALICE));
        let session = connector(&chain).connect().await.unwrap();

        chain.with_state(|s| s.chain_id = ChainId(5));
        assert!(matches!(session.provider().await, Err(ChainError::WrongNetwork { .. })));
        assert!(matches!(session.ensure_network().await, Err(ChainError::WrongNetwork { .. })));
    }

    #[tokio::test]
    async fn signer_follows_account_switch() {
        let bob = address!("0000000000000000000000000000000000000b0b");
        let chain = Rc::new(InMemoryChain::new(ALICE));
        let session = connector(&chain).connect().await.unwrap();

        chain.with_state(|s| s.accounts = vec![bob]);
        let signer = session.signer().await.unwrap();
        assert_eq!(signer.address(), bob);
    }
}
