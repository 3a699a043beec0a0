//! User-triggered flows: connecting the wallet and the three writes.

use crate::state::{Event, LoadingGuard};
use crate::Dapp;
use cd_chain_client::ChainError;
use cd_chain_evm::PendingTx;
use tracing::info;

pub const MINT_SUCCESS_MESSAGE: &str = "You have Minted one crypto dev, Congratulations";
pub const PRESALE_MINT_SUCCESS_MESSAGE: &str = "You successfully minted a Crypto Dev!";

impl Dapp {
    /// Prompts for wallet access the first time; afterwards reuses the
    /// session. The network is checked on every click, cached session or not.
    pub async fn connect_wallet(&self) {
        if let Err(err) = self.try_connect_wallet().await {
            self.report("connect_wallet", &err);
        }
    }

    async fn try_connect_wallet(&self) -> Result<(), ChainError> {
        self.session().await?.ensure_network().await?;
        self.store().dispatch(Event::WalletConnected);
        Ok(())
    }

    /// Owner-only on the contract side; the page only offers it to the owner.
    pub async fn start_presale(&self) {
        if let Err(err) = self.try_start_presale().await {
            self.report("start_presale", &err);
        }
    }

    async fn try_start_presale(&self) -> Result<(), ChainError> {
        let pending = self.writer().await?.start_presale().await?;
        self.confirm(pending).await?;

        if self.check_presale_started().await {
            self.check_presale_ended().await;
        }
        Ok(())
    }

    pub async fn public_mint(&self) {
        if let Err(err) = self.try_public_mint().await {
            self.report("public_mint", &err);
        }
    }

    async fn try_public_mint(&self) -> Result<(), ChainError> {
        let pending = self.writer().await?.mint(self.config.mint_price_wei).await?;
        self.confirm(pending).await?;
        self.notifier.alert(MINT_SUCCESS_MESSAGE);
        Ok(())
    }

    /// Whitelist-gated on the contract side.
    pub async fn presale_mint(&self) {
        if let Err(err) = self.try_presale_mint().await {
            self.report("presale_mint", &err);
        }
    }

    async fn try_presale_mint(&self) -> Result<(), ChainError> {
        let pending = self
            .writer()
            .await?
            .presale_mint(self.config.mint_price_wei)
            .await?;
        self.confirm(pending).await?;
        self.notifier.alert(PRESALE_MINT_SUCCESS_MESSAGE);
        Ok(())
    }

    /// Loading is held from submission until the receipt settles.
    async fn confirm(&self, pending: PendingTx) -> Result<(), ChainError> {
        let _loading = LoadingGuard::engage(self.store());
        let receipt = pending.wait(self.timer.as_ref()).await?;
        info!(hash = %receipt.tx_hash, block = ?receipt.block_number, "transaction settled");
        Ok(())
    }
}
