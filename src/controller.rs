use std::{fmt, sync::Arc};

use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::{
    client::{CounterClient, CounterState},
    error::CounterError,
    ledger::Ledger,
    wallet::Wallet,
};

/// Connection lifecycle.
///
/// `Connecting` means the wallet is known but no ledger handle exists yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Ready,
}

/// The single action the view offers once connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Initialize,
    Increment,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct View {
    pub phase: Phase,
    pub identity: Option<Pubkey>,
    /// `None` until a fetch finds an initialized counter.
    pub count: Option<u64>,
    pub loading: bool,
    /// Failure shown to the user until dismissed or replaced.
    pub notice: Option<String>,
}

impl View {
    pub fn action(&self) -> Option<Action> {
        if self.phase != Phase::Ready {
            return None;
        }
        Some(match self.count {
            Some(_) => Action::Increment,
            None => Action::Initialize,
        })
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solana PDA Counter")?;
        match self.identity {
            Some(identity) => writeln!(f, "Wallet: {identity}")?,
            None => writeln!(f, "Wallet: [connect]")?,
        }
        match self.phase {
            Phase::Disconnected => writeln!(f, "Connect your wallet to continue.")?,
            Phase::Connecting => writeln!(f, "Initializing program...")?,
            Phase::Ready => {
                if let Some(count) = self.count {
                    writeln!(f, "My Counter: {count}")?;
                }
                let label = match self.action() {
                    Some(Action::Increment) => "Increment",
                    _ => "Initialize My Counter",
                };
                if self.loading {
                    writeln!(f, "[{label}] (busy)")?;
                } else {
                    writeln!(f, "[{label}]")?;
                }
            }
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        Ok(())
    }
}

pub enum Event {
    WalletConnected(Arc<dyn Wallet>),
    WalletDisconnected,
    LedgerReady(Arc<dyn Ledger>),
    LedgerLost,
    Refresh,
    Initialize,
    Increment,
    DismissNotice,
}

/// Owns the view state and is its only writer.
pub struct Controller {
    client: CounterClient,
    view: View,
}

impl Controller {
    pub fn new(client: CounterClient) -> Self {
        Self {
            client,
            view: View::default(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn client(&self) -> &CounterClient {
        &self.client
    }

    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::WalletConnected(wallet) => {
                let switched = wallet.identity() != self.client.identity();
                self.client.set_wallet(Some(wallet));
                self.transition(switched).await;
            }
            Event::WalletDisconnected => {
                self.client.set_wallet(None);
                self.transition(false).await;
            }
            Event::LedgerReady(ledger) => {
                let switched = !self
                    .client
                    .ledger()
                    .is_some_and(|current| Arc::ptr_eq(current, &ledger));
                self.client.set_ledger(Some(ledger));
                self.transition(switched).await;
            }
            Event::LedgerLost => {
                self.client.set_ledger(None);
                self.transition(false).await;
            }
            Event::Refresh => self.refresh().await,
            Event::Initialize => self.initialize().await,
            Event::Increment => self.increment().await,
            Event::DismissNotice => self.view.notice = None,
        }
    }

    pub async fn refresh(&mut self) {
        if self.view.phase != Phase::Ready {
            return;
        }
        let result = self.client.fetch().await;
        if result.is_err() {
            // Nothing confirmed is left to show.
            self.view.count = None;
        }
        self.apply(result);
    }

    pub async fn initialize(&mut self) {
        if self.view.phase != Phase::Ready {
            return;
        }
        self.view.loading = true;
        let result = self.client.initialize().await;
        self.view.loading = false;
        self.apply(result);
    }

    pub async fn increment(&mut self) {
        if self.view.phase != Phase::Ready {
            return;
        }
        self.view.loading = true;
        let result = self.client.increment().await;
        self.view.loading = false;
        self.apply(result);
    }

    fn phase(&self) -> Phase {
        match (self.client.identity(), self.client.has_ledger()) {
            (None, _) => Phase::Disconnected,
            (Some(_), false) => Phase::Connecting,
            (Some(_), true) => Phase::Ready,
        }
    }

    /// `switched` is set when the wallet identity or ledger handle was replaced,
    /// which invalidates the counter shown even if the phase stays `Ready`.
    async fn transition(&mut self, switched: bool) {
        let previous = self.view.phase;
        let next = self.phase();
        self.view.phase = next;
        self.view.identity = self.client.identity();
        if next == previous && !(switched && next == Phase::Ready) {
            return;
        }
        info!(?previous, ?next, switched, "Connection state changed");
        self.view.count = None;
        self.view.loading = false;
        if next == Phase::Ready {
            self.refresh().await;
        }
    }

    fn apply(&mut self, result: Result<Option<CounterState>, CounterError>) {
        match result {
            Ok(Some(state)) => self.view.count = state.count(),
            // Guard fired: nothing was requested, nothing to show.
            Ok(None) => {}
            Err(error) => {
                warn!(%error, "Counter operation failed");
                self.view.notice = Some(error.to_string());
            }
        }
    }
}
