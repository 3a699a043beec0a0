//! Read-only and signer-bound handles to the NFT contract.

use crate::abi::{ICryptoDevs, function_name};
use crate::connector::{ProviderHandle, SignerHandle};
use alloy_primitives::{Address, B256, Bytes, U64, U256};
use alloy_sol_types::SolCall;
use cd_api_types::RECEIPT_POLL_INTERVAL;
use cd_chain_client::{ChainError, Timer};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Binds the fixed contract address to whichever provider or signer the
/// caller currently holds. Handles are cheap and never cached.
#[derive(Debug, Clone, Copy)]
pub struct ContractGateway {
    address: Address,
}

impl ContractGateway {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn read_only(&self, provider: ProviderHandle) -> ReadableContract {
        ReadableContract {
            address: self.address,
            provider,
        }
    }

    pub fn writable(&self, signer: SignerHandle) -> WritableContract {
        WritableContract {
            address: self.address,
            signer,
        }
    }
}

pub struct ReadableContract {
    address: Address,
    provider: ProviderHandle,
}

impl ReadableContract {
    pub async fn owner(&self) -> Result<Address, ChainError> {
        Ok(self.call(ICryptoDevs::ownerCall {}).await?._0)
    }

    pub async fn token_ids(&self) -> Result<U256, ChainError> {
        Ok(self.call(ICryptoDevs::tokenIdsCall {}).await?._0)
    }

    pub async fn presale_started(&self) -> Result<bool, ChainError> {
        Ok(self.call(ICryptoDevs::presaleStartedCall {}).await?._0)
    }

    /// Unix timestamp (seconds) at which the presale closes.
    pub async fn presale_ended(&self) -> Result<U256, ChainError> {
        Ok(self.call(ICryptoDevs::presaleEndedCall {}).await?._0)
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, ChainError> {
        let name = function_name::<C>();
        let params = json!([
            { "to": self.address, "data": Bytes::from(call.abi_encode()) },
            "latest"
        ]);
        let raw = self.provider.request("eth_call", params).await?;
        let data: Bytes = parse(name, raw)?;

        C::abi_decode_returns(&data, true).map_err(|err| ChainError::call(name, err))
    }
}

pub struct WritableContract {
    address: Address,
    signer: SignerHandle,
}

impl WritableContract {
    pub async fn start_presale(&self) -> Result<PendingTx, ChainError> {
        self.send(ICryptoDevs::startPresaleCall {}, None).await
    }

    pub async fn mint(&self, payment: U256) -> Result<PendingTx, ChainError> {
        self.send(ICryptoDevs::mintCall {}, Some(payment)).await
    }

    pub async fn presale_mint(&self, payment: U256) -> Result<PendingTx, ChainError> {
        self.send(ICryptoDevs::presaleMintCall {}, Some(payment)).await
    }

    async fn send<C: SolCall>(&self, call: C, value: Option<U256>) -> Result<PendingTx, ChainError> {
        let name = function_name::<C>();
        let mut tx = json!({
            "from": self.signer.address(),
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        });
        if let Some(value) = value {
            tx["value"] = json!(value);
        }

        let raw = self
            .signer
            .provider()
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        let hash: B256 = parse(name, raw)?;

        info!(function = name, %hash, "transaction submitted");
        Ok(PendingTx {
            hash,
            function: name,
            provider: self.signer.provider().clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    #[serde(default)]
    status: Option<U64>,
    #[serde(default)]
    block_number: Option<U64>,
}

/// A submitted transaction that has not been confirmed yet.
pub struct PendingTx {
    hash: B256,
    function: &'static str,
    provider: ProviderHandle,
}

impl PendingTx {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Poll for the receipt until the transaction is mined. No timeout.
    pub async fn wait(&self, timer: &dyn Timer) -> Result<Receipt, ChainError> {
        loop {
            let raw = self
                .provider
                .request("eth_getTransactionReceipt", json!([self.hash]))
                .await?;

            if raw.is_null() {
                debug!(hash = %self.hash, "receipt not available yet");
                timer.sleep(RECEIPT_POLL_INTERVAL).await;
                continue;
            }

            let receipt: RawReceipt = parse(self.function, raw)?;
            if receipt.status == Some(U64::ZERO) {
                return Err(ChainError::call(self.function, "transaction reverted"));
            }

            let block_number = receipt.block_number.map(|n| n.to::<u64>());
            info!(function = self.function, hash = %self.hash, ?block_number, "transaction confirmed");
            return Ok(Receipt {
                tx_hash: self.hash,
                block_number,
            });
        }
    }
}

fn parse<T: DeserializeOwned>(method: &str, raw: Value) -> Result<T, ChainError> {
    serde_json::from_value(raw).map_err(|err| ChainError::call(method, format!("unexpected response: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::WalletConnector;
    use crate::in_memory::InMemoryChain;
    use alloy_primitives::address;
    use cd_api_types::{ChainId, mint_price_wei};
    use cd_chain_client::ImmediateTimer;
    use std::rc::Rc;

    const OWNER: Address = address!("00000000000000000000000000000000000a11ce");
    const MINTER: Address = address!("0000000000000000000000000000000000000b0b");

    async fn setup(account: Address) -> (Rc<InMemoryChain>, ContractGateway, crate::WalletSession) {
        let chain = Rc::new(InMemoryChain::new(OWNER));
        chain.with_state(|s| s.accounts = vec![account]);
        let session = WalletConnector::new(chain.clone(), ChainId(4))
            .connect()
            .await
            .unwrap();
        (chain.clone(), ContractGateway::new(chain.contract()), session)
    }

    #[tokio::test]
    async fn reads_contract_state() {
        let (chain, gateway, session) = setup(MINTER).await;
        chain.with_state(|s| {
            s.token_ids = U256::from(7u8);
            s.presale_ended_at = U256::from(1_700_000_000u64);
        });

        let contract = gateway.read_only(session.provider().await.unwrap());
        assert_eq!(contract.owner().await.unwrap(), OWNER);
        assert_eq!(contract.token_ids().await.unwrap(), U256::from(7u8));
        assert!(!contract.presale_started().await.unwrap());
        assert_eq!(contract.presale_ended().await.unwrap(), U256::from(1_700_000_000u64));
    }

    #[tokio::test]
    async fn token_ids_are_stable_between_reads() {
        let (_chain, gateway, session) = setup(MINTER).await;
        let contract = gateway.read_only(session.provider().await.unwrap());
        let first = contract.token_ids().await.unwrap();
        let second = contract.token_ids().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failing_read_is_a_chain_call_error() {
        let (chain, gateway, session) = setup(MINTER).await;
        chain.with_state(|s| s.fail_reads = true);

        let contract = gateway.read_only(session.provider().await.unwrap());
        assert!(matches!(
            contract.presale_started().await,
            Err(ChainError::ChainCall { .. })
        ));
    }

    #[tokio::test]
    async fn mint_sends_payment_and_waits_for_receipt() {
        let (chain, gateway, session) = setup(MINTER).await;
        chain.with_state(|s| {
            s.presale_started = true;
            s.receipt_delay_polls = 2;
        });
        let timer = ImmediateTimer::default();

        let contract = gateway.writable(session.signer().await.unwrap());
        let pending = contract.mint(mint_price_wei().unwrap()).await.unwrap();
        let receipt = pending.wait(&timer).await.unwrap();

        assert_eq!(receipt.tx_hash, pending.hash());
        assert_eq!(receipt.block_number, Some(1));
        assert_eq!(timer.sleeps(), 2);
        chain.with_state(|s| {
            assert_eq!(s.token_ids, U256::from(1u8));
            assert_eq!(s.sent.last(), Some(&("mint", mint_price_wei().unwrap())));
        });
    }

    #[tokio::test]
    async fn non_owner_start_presale_reverts_on_wait() {
        let (chain, gateway, session) = setup(MINTER).await;
        let contract = gateway.writable(session.signer().await.unwrap());

        let pending = contract.start_presale().await.unwrap();
        let err = pending.wait(&ImmediateTimer::default()).await.unwrap_err();

        assert_eq!(err, ChainError::call("startPresale", "transaction reverted"));
        chain.with_state(|s| assert!(!s.presale_started));
    }

    #[tokio::test]
    async fn owner_start_presale_flips_flag() {
        let (chain, gateway, session) = setup(OWNER).await;
        let contract = gateway.writable(session.signer().await.unwrap());

        contract
            .start_presale()
            .await
            .unwrap()
            .wait(&ImmediateTimer::default())
            .await
            .unwrap();
        chain.with_state(|s| assert!(s.presale_started));
    }
}
