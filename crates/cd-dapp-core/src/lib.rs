//! Orchestration behind the Crypto Devs mint page.
//!
//! `Dapp` owns the wallet session and the store; the poller and transaction
//! flows in the submodules are methods on it so the UI can spawn them as
//! independent local tasks.

pub mod orchestrator;
pub mod poller;
pub mod state;
pub mod view;

use cd_api_types::DappConfig;
use cd_chain_client::{ChainError, Clock, Eip1193Provider, Timer};
use cd_chain_evm::{ContractGateway, ReadableContract, WalletConnector, WalletSession, WritableContract};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

pub use orchestrator::{MINT_SUCCESS_MESSAGE, PRESALE_MINT_SUCCESS_MESSAGE};
pub use poller::StatusTick;
pub use state::{AppState, Event, LoadingGuard, PollTick, Store};
pub use view::{RenderState, ViewFlags};

/// Blocking user-facing message (`window.alert` in the browser).
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub struct Dapp {
    config: DappConfig,
    connector: WalletConnector,
    gateway: ContractGateway,
    session: RefCell<Option<WalletSession>>,
    store: Store,
    notifier: Rc<dyn Notifier>,
    timer: Rc<dyn Timer>,
    clock: Rc<dyn Clock>,
}

impl Dapp {
    pub fn new(
        config: DappConfig,
        provider: Rc<dyn Eip1193Provider>,
        notifier: Rc<dyn Notifier>,
        timer: Rc<dyn Timer>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            connector: WalletConnector::new(provider, config.chain_id),
            gateway: ContractGateway::new(config.contract_address),
            config,
            session: RefCell::new(None),
            store: Store::new(),
            notifier,
            timer,
            clock,
        }
    }

    pub fn config(&self) -> &DappConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn render_state(&self) -> RenderState {
        RenderState::from_flags(self.store.snapshot().view_flags())
    }

    /// The current session, connecting first if there is none yet.
    async fn session(&self) -> Result<WalletSession, ChainError> {
        let cached = self.session.borrow().clone();
        if let Some(session) = cached {
            return Ok(session);
        }

        let session = self.connector.connect().await?;
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }

    async fn reader(&self) -> Result<ReadableContract, ChainError> {
        let session = self.session().await?;
        Ok(self.gateway.read_only(session.provider().await?))
    }

    async fn writer(&self) -> Result<WritableContract, ChainError> {
        let session = self.session().await?;
        Ok(self.gateway.writable(session.signer().await?))
    }

    /// Log a failed flow. Only a network mismatch reaches the user.
    fn report(&self, flow: &str, err: &ChainError) {
        warn!(flow, error = %err, "flow failed");
        if matches!(err, ChainError::WrongNetwork { .. }) {
            self.notifier
                .alert(&format!("Change to the {} network", self.config.network_name));
        }
    }
}
