//! Page state and the single store every async flow writes through.
//!
//! Flows never touch fields directly: they dispatch an [`Event`], the store
//! applies it, then notifies subscribers with the new snapshot.

use alloy_primitives::U256;
use std::cell::RefCell;

use crate::view::ViewFlags;

/// A partial observation from one poll. Timer A and Timer B each fill in only
/// the fields they read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollTick {
    pub started: Option<bool>,
    pub ended: Option<bool>,
    pub minted: Option<U256>,
}

impl PollTick {
    pub fn started(started: bool) -> Self {
        Self {
            started: Some(started),
            ..Self::default()
        }
    }

    pub fn ended(ended: bool) -> Self {
        Self {
            ended: Some(ended),
            ..Self::default()
        }
    }

    pub fn minted(minted: U256) -> Self {
        Self {
            minted: Some(minted),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    WalletConnected,
    PollTick(PollTick),
    OwnerResolved { is_owner: bool },
    TxStarted,
    TxSettled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub wallet_connected: bool,
    pub is_owner: bool,
    pub presale_started: bool,
    pub presale_ended: bool,
    pub tokens_minted: U256,
    pub pending_txs: u32,
}

impl AppState {
    pub fn loading(&self) -> bool {
        self.pending_txs > 0
    }

    pub fn view_flags(&self) -> ViewFlags {
        ViewFlags {
            wallet_connected: self.wallet_connected,
            loading: self.loading(),
            is_owner: self.is_owner,
            presale_started: self.presale_started,
            presale_ended: self.presale_ended,
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::WalletConnected => self.wallet_connected = true,
            Event::PollTick(tick) => {
                if let Some(started) = tick.started {
                    self.presale_started = started;
                }
                if let Some(ended) = tick.ended {
                    self.presale_ended = ended;
                }
                if let Some(minted) = tick.minted {
                    self.tokens_minted = minted;
                }
            }
            // Latched: once the owner is seen it stays set for the page's lifetime.
            Event::OwnerResolved { is_owner } => {
                if is_owner {
                    self.is_owner = true;
                }
            }
            Event::TxStarted => self.pending_txs += 1,
            Event::TxSettled => self.pending_txs = self.pending_txs.saturating_sub(1),
        }
    }
}

type Listener = Box<dyn Fn(&AppState)>;

#[derive(Default)]
pub struct Store {
    state: RefCell<AppState>,
    listeners: RefCell<Vec<Listener>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&AppState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn dispatch(&self, event: Event) {
        tracing::trace!(?event, "dispatch");
        let snapshot = {
            let mut state = self.state.borrow_mut();
            state.apply(event);
            state.clone()
        };
        for listener in self.listeners.borrow().iter() {
            listener(&snapshot);
        }
    }
}

/// Holds the loading flag for one write transaction, from submission until
/// the guard is dropped, whichever way the flow exits.
pub struct LoadingGuard<'a> {
    store: &'a Store,
}

impl<'a> LoadingGuard<'a> {
    pub fn engage(store: &'a Store) -> Self {
        store.dispatch(Event::TxStarted);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Event::TxSettled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn poll_tick_only_touches_observed_fields() {
        let mut state = AppState {
            presale_started: true,
            tokens_minted: U256::from(3u8),
            ..AppState::default()
        };
        state.apply(Event::PollTick(PollTick::ended(true)));

        assert!(state.presale_started);
        assert!(state.presale_ended);
        assert_eq!(state.tokens_minted, U256::from(3u8));
    }

    #[test]
    fn ended_is_read_through_without_smoothing() {
        let mut state = AppState::default();
        state.apply(Event::PollTick(PollTick::ended(true)));
        state.apply(Event::PollTick(PollTick::ended(false)));
        assert!(!state.presale_ended);
    }

    #[test]
    fn owner_flag_latches() {
        let mut state = AppState::default();
        state.apply(Event::OwnerResolved { is_owner: true });
        state.apply(Event::OwnerResolved { is_owner: false });
        assert!(state.is_owner);
    }

    #[test]
    fn overlapping_transactions_keep_loading_until_both_settle() {
        let mut state = AppState::default();
        state.apply(Event::TxStarted);
        state.apply(Event::TxStarted);
        state.apply(Event::TxSettled);
        assert!(state.loading());
        state.apply(Event::TxSettled);
        assert!(!state.loading());
    }

    #[test]
    fn settle_without_start_does_not_underflow() {
        let mut state = AppState::default();
        state.apply(Event::TxSettled);
        assert_eq!(state.pending_txs, 0);
    }

    #[test]
    fn subscribers_see_each_snapshot() {
        let store = Store::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state| sink.borrow_mut().push(state.wallet_connected));

        store.dispatch(Event::WalletConnected);
        store.dispatch(Event::TxStarted);

        assert_eq!(*seen.borrow(), vec![true, true]);
    }

    #[test]
    fn dropped_guard_clears_loading() {
        let store = Store::new();
        {
            let _guard = LoadingGuard::engage(&store);
            assert!(store.snapshot().loading());
        }
        assert!(!store.snapshot().loading());
    }
}
