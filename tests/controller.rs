use async_trait::async_trait;
use pda_counter::{
    ledger::{Ledger, LedgerError, MemoryLedger},
    Action, Controller, CounterClient, Event, Phase,
};
use solana_client::client_error::ClientError;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

mod utils;

/// Counts reads and can be switched into a failing mode.
struct ObservedLedger {
    inner: MemoryLedger,
    reads: AtomicUsize,
    offline: std::sync::atomic::AtomicBool,
}

impl ObservedLedger {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryLedger::new(utils::interface()),
            reads: AtomicUsize::new(0),
            offline: Default::default(),
        })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            let error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "offline");
            return Err(ClientError::from(error).into());
        }
        Ok(())
    }
}

#[async_trait]
impl Ledger for ObservedLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.get_account(address).await
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        self.check()?;
        self.inner.latest_blockhash().await
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        self.check()?;
        self.inner.send_transaction(tx).await
    }
}

fn controller() -> Controller {
    Controller::new(CounterClient::new(utils::interface()))
}

#[tokio::test]
async fn walks_disconnected_connecting_ready() {
    let ledger = ObservedLedger::new();
    let (wallet, identity) = utils::wallet();
    let mut controller = controller();
    assert_eq!(controller.view().phase, Phase::Disconnected);
    assert_eq!(controller.view().action(), None);

    controller.handle(Event::WalletConnected(wallet)).await;
    assert_eq!(controller.view().phase, Phase::Connecting);
    assert_eq!(controller.view().identity, Some(identity));
    assert_eq!(ledger.reads(), 0);

    controller.handle(Event::LedgerReady(ledger.clone())).await;
    assert_eq!(controller.view().phase, Phase::Ready);
    assert_eq!(ledger.reads(), 1);
    assert_eq!(controller.view().count, None);
    assert_eq!(controller.view().action(), Some(Action::Initialize));
    assert_eq!(controller.view().notice, None);
}

#[tokio::test]
async fn refetches_only_on_entry_to_ready() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();

    // Ledger first: still waiting for a wallet, so nothing is read.
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    assert_eq!(controller.view().phase, Phase::Disconnected);
    assert_eq!(ledger.reads(), 0);

    controller.handle(Event::WalletConnected(wallet.clone())).await;
    assert_eq!(controller.view().phase, Phase::Ready);
    assert_eq!(ledger.reads(), 1);

    // Reconnecting the same wallet does not re-enter Ready.
    controller.handle(Event::WalletConnected(wallet.clone())).await;
    assert_eq!(ledger.reads(), 1);

    controller.handle(Event::WalletDisconnected).await;
    assert_eq!(controller.view().phase, Phase::Disconnected);
    controller.handle(Event::WalletConnected(wallet)).await;
    assert_eq!(ledger.reads(), 2);
}

#[tokio::test]
async fn initialize_then_increment_updates_the_view() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(ledger)).await;

    controller.handle(Event::Initialize).await;
    assert_eq!(controller.view().count, Some(0));
    assert_eq!(controller.view().action(), Some(Action::Increment));
    assert!(!controller.view().loading);

    controller.handle(Event::Increment).await;
    controller.handle(Event::Increment).await;
    assert_eq!(controller.view().count, Some(2));
    assert!(controller.view().to_string().contains("My Counter: 2"));
}

#[tokio::test]
async fn failures_become_notices_and_reset_loading() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    controller.handle(Event::Initialize).await;

    controller.handle(Event::Initialize).await;
    let notice = controller.view().notice.clone().expect("duplicate initialize must be reported");
    assert!(notice.contains("already initialized"));
    assert!(!controller.view().loading);
    assert_eq!(controller.view().count, Some(0));

    controller.handle(Event::DismissNotice).await;
    assert_eq!(controller.view().notice, None);

    ledger.go_offline();
    controller.handle(Event::Increment).await;
    assert!(controller.view().notice.is_some());
    assert!(!controller.view().loading);
    assert_eq!(controller.view().count, Some(0));
}

#[tokio::test]
async fn disconnect_clears_counter_and_ignores_actions() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    controller.handle(Event::Initialize).await;

    controller.handle(Event::WalletDisconnected).await;
    assert_eq!(controller.view().phase, Phase::Disconnected);
    assert_eq!(controller.view().count, None);
    assert_eq!(controller.view().identity, None);

    let reads = ledger.reads();
    controller.handle(Event::Increment).await;
    controller.handle(Event::Refresh).await;
    assert_eq!(ledger.reads(), reads);
    assert_eq!(controller.view().notice, None);
    assert!(controller
        .view()
        .to_string()
        .contains("Connect your wallet to continue."));
}

#[tokio::test]
async fn losing_the_ledger_falls_back_to_connecting() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    controller.handle(Event::Initialize).await;

    controller.handle(Event::LedgerLost).await;
    assert_eq!(controller.view().phase, Phase::Connecting);
    assert_eq!(controller.view().count, None);

    controller.handle(Event::LedgerReady(ledger)).await;
    assert_eq!(controller.view().phase, Phase::Ready);
    assert_eq!(controller.view().count, Some(0));
}

#[tokio::test]
async fn switching_wallets_refetches_for_the_new_identity() {
    let ledger = ObservedLedger::new();
    let (alice, _) = utils::wallet();
    let (bob, bob_identity) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(alice)).await;
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    controller.handle(Event::Initialize).await;
    controller.handle(Event::Increment).await;
    assert_eq!(controller.view().count, Some(1));

    // Still Ready, but the counter shown belonged to the previous identity.
    let reads = ledger.reads();
    controller.handle(Event::WalletConnected(bob)).await;
    assert_eq!(controller.view().phase, Phase::Ready);
    assert_eq!(controller.view().identity, Some(bob_identity));
    assert_eq!(controller.view().count, None);
    assert_eq!(controller.view().action(), Some(Action::Initialize));
    assert_eq!(ledger.reads(), reads + 1);
}

#[tokio::test]
async fn replacing_the_ledger_refetches() {
    let first = ObservedLedger::new();
    let second = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(first.clone())).await;
    controller.handle(Event::Initialize).await;
    assert_eq!(controller.view().count, Some(0));

    // Announcing the same handle again is not a switch.
    let reads = first.reads();
    controller.handle(Event::LedgerReady(first.clone())).await;
    assert_eq!(first.reads(), reads);
    assert_eq!(controller.view().count, Some(0));

    controller.handle(Event::LedgerReady(second.clone())).await;
    assert_eq!(controller.view().phase, Phase::Ready);
    assert_eq!(second.reads(), 1);
    assert_eq!(controller.view().count, None);
}

#[tokio::test]
async fn failed_refresh_clears_the_counter() {
    let ledger = ObservedLedger::new();
    let (wallet, _) = utils::wallet();
    let mut controller = controller();
    controller.handle(Event::WalletConnected(wallet)).await;
    controller.handle(Event::LedgerReady(ledger.clone())).await;
    controller.handle(Event::Initialize).await;
    assert_eq!(controller.view().count, Some(0));

    ledger.go_offline();
    controller.handle(Event::Refresh).await;
    assert_eq!(controller.view().count, None);
    assert!(controller.view().notice.is_some());
    assert!(!controller.view().loading);
}
