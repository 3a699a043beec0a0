//! Presale status and supply polling.
//!
//! Timer A re-checks started/ended until ended is seen; Timer B re-reads the
//! minted count forever. The two never coordinate.

use crate::state::{Event, PollTick};
use crate::Dapp;
use alloy_primitives::U256;
use cd_api_types::POLL_INTERVAL;
use cd_chain_client::ChainError;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTick {
    Continue,
    /// Presale has ended; the phase can no longer change.
    Terminal,
}

impl Dapp {
    /// Initial load: connect, read status (ended only if started), read supply.
    pub async fn mount(&self) {
        self.connect_wallet().await;
        if self.check_presale_started().await {
            self.check_presale_ended().await;
        }
        self.refresh_tokens_minted().await;
    }

    /// Reads `presaleStarted`. While it is false the owner check runs too.
    /// A failed read counts as not started.
    pub async fn check_presale_started(&self) -> bool {
        match self.read_presale_started().await {
            Ok(started) => started,
            Err(err) => {
                self.report("presale_started", &err);
                false
            }
        }
    }

    async fn read_presale_started(&self) -> Result<bool, ChainError> {
        let started = self.reader().await?.presale_started().await?;
        if !started {
            self.check_owner().await;
        }
        self.store().dispatch(Event::PollTick(PollTick::started(started)));
        Ok(started)
    }

    /// Compares the presale end timestamp against the local clock.
    pub async fn check_presale_ended(&self) -> bool {
        match self.read_presale_ended().await {
            Ok(ended) => ended,
            Err(err) => {
                self.report("presale_ended", &err);
                false
            }
        }
    }

    async fn read_presale_ended(&self) -> Result<bool, ChainError> {
        let ends_at = self.reader().await?.presale_ended().await?;
        let ended = ends_at < U256::from(self.clock.now_secs());
        self.store().dispatch(Event::PollTick(PollTick::ended(ended)));
        Ok(ended)
    }

    pub async fn check_owner(&self) {
        match self.read_is_owner().await {
            Ok(true) => self.store().dispatch(Event::OwnerResolved { is_owner: true }),
            Ok(false) => debug!("connected account is not the contract owner"),
            Err(err) => self.report("owner", &err),
        }
    }

    async fn read_is_owner(&self) -> Result<bool, ChainError> {
        let session = self.session().await?;
        let signer = session.signer().await?;
        let owner = self.gateway.read_only(session.provider().await?).owner().await?;
        Ok(owner == signer.address())
    }

    pub async fn refresh_tokens_minted(&self) -> Option<U256> {
        match self.read_tokens_minted().await {
            Ok(minted) => Some(minted),
            Err(err) => {
                self.report("tokens_minted", &err);
                None
            }
        }
    }

    async fn read_tokens_minted(&self) -> Result<U256, ChainError> {
        let minted = self.reader().await?.token_ids().await?;
        self.store().dispatch(Event::PollTick(PollTick::minted(minted)));
        Ok(minted)
    }

    /// One Timer A tick. `ended` is only read after `started` was seen true in
    /// the same tick.
    pub async fn status_tick(&self) -> StatusTick {
        if self.check_presale_started().await && self.check_presale_ended().await {
            StatusTick::Terminal
        } else {
            StatusTick::Continue
        }
    }

    /// Timer A. Returns once the presale is observed ended.
    pub async fn run_status_timer(&self) {
        loop {
            self.timer.sleep(POLL_INTERVAL).await;
            if self.status_tick().await == StatusTick::Terminal {
                info!("presale ended, status polling stopped");
                return;
            }
        }
    }

    /// Timer B. Never returns; minting continues after the presale.
    pub async fn run_minted_timer(&self) {
        loop {
            self.timer.sleep(POLL_INTERVAL).await;
            self.refresh_tokens_minted().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{GENESIS, MINTER, OWNER, harness};
    use crate::view::RenderState;
    use std::time::Duration;

    #[tokio::test]
    async fn mount_for_visitor_before_presale() {
        let h = harness(MINTER);
        h.chain.with_state(|s| s.token_ids = U256::from(4u8));

        h.dapp.mount().await;

        let state = h.dapp.store().snapshot();
        assert!(state.wallet_connected);
        assert!(!state.is_owner);
        assert!(!state.presale_started);
        assert_eq!(state.tokens_minted, U256::from(4u8));
        assert_eq!(h.dapp.render_state(), RenderState::PresaleNotStarted);
        assert!(!h.chain.reads().contains(&"presaleEnded".to_owned()));
    }

    #[tokio::test]
    async fn mount_for_owner_offers_start() {
        let h = harness(OWNER);
        h.dapp.mount().await;

        assert!(h.dapp.store().snapshot().is_owner);
        assert_eq!(h.dapp.render_state(), RenderState::StartPresale);
    }

    #[tokio::test]
    async fn mount_during_presale_reads_ended_after_started() {
        let h = harness(MINTER);
        h.chain.with_state(|s| {
            s.presale_started = true;
            s.presale_ended_at = U256::from(GENESIS + 300);
        });

        h.dapp.mount().await;

        assert_eq!(
            h.chain.reads(),
            vec!["presaleStarted", "presaleEnded", "tokenIds"]
        );
        assert_eq!(h.dapp.render_state(), RenderState::PresaleMint);
    }

    #[tokio::test]
    async fn ended_compares_against_the_clock() {
        let h = harness(MINTER);
        h.chain.with_state(|s| {
            s.presale_started = true;
            s.presale_ended_at = U256::from(GENESIS + 300);
        });

        assert!(!h.dapp.check_presale_ended().await);
        h.clock.advance(Duration::from_secs(301));
        assert!(h.dapp.check_presale_ended().await);
        assert!(h.dapp.store().snapshot().presale_ended);
    }

    #[tokio::test]
    async fn status_tick_skips_ended_check_before_start() {
        let h = harness(MINTER);
        assert_eq!(h.dapp.status_tick().await, StatusTick::Continue);
        assert!(!h.chain.reads().contains(&"presaleEnded".to_owned()));
    }

    #[tokio::test]
    async fn failed_read_counts_as_not_started_and_is_not_retried() {
        let h = harness(MINTER);
        h.dapp.connect_wallet().await;
        h.chain.with_state(|s| {
            s.presale_started = true;
            s.fail_reads = true;
        });

        assert_eq!(h.dapp.status_tick().await, StatusTick::Continue);
        assert_eq!(h.chain.reads(), vec!["presaleStarted"]);
        assert!(h.notifier.alerts.borrow().is_empty());
    }

    #[tokio::test]
    async fn repeated_supply_refresh_is_stable() {
        let h = harness(MINTER);
        h.chain.with_state(|s| s.token_ids = U256::from(9u8));

        let first = h.dapp.refresh_tokens_minted().await;
        let second = h.dapp.refresh_tokens_minted().await;
        assert_eq!(first, Some(U256::from(9u8)));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn wrong_network_alerts_on_poll() {
        let h = harness(MINTER);
        h.chain.with_state(|s| s.chain_id = cd_api_types::ChainId(1));

        assert_eq!(h.dapp.refresh_tokens_minted().await, None);
        assert_eq!(
            *h.notifier.alerts.borrow(),
            vec!["Change to the rinkeby network".to_owned()]
        );
    }

    #[tokio::test]
    async fn status_timer_stops_once_presale_ended() {
        let h = harness(MINTER);
        h.dapp.mount().await;
        h.chain.with_state(|s| {
            s.presale_started = true;
            s.presale_ended_at = U256::from(GENESIS + 300);
        });
        h.clock.advance(Duration::from_secs(600));

        h.dapp.run_status_timer().await;

        assert_eq!(h.timer.sleeps(), 1);
        let state = h.dapp.store().snapshot();
        assert!(state.presale_started && state.presale_ended);
        assert_eq!(h.dapp.render_state(), RenderState::PublicMint);
    }

    #[tokio::test]
    async fn supply_timer_outlives_status_timer() {
        let h = harness(MINTER);
        h.dapp.mount().await;
        h.chain.with_state(|s| {
            s.presale_started = true;
            s.presale_ended_at = U256::from(GENESIS);
            s.token_ids = U256::from(12u8);
        });
        h.clock.advance(Duration::from_secs(1));

        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let supply = h.dapp.clone();
                let minted = tokio::task::spawn_local(async move { supply.run_minted_timer().await });
                h.dapp.run_status_timer().await;
                for _ in 0..4 {
                    tokio::task::yield_now().await;
                }
                assert!(!minted.is_finished());
                minted.abort();
            })
            .await;

        assert_eq!(h.dapp.store().snapshot().tokens_minted, U256::from(12u8));
    }
}
