#![allow(dead_code)]

use std::sync::Arc;

use pda_counter::{
    ledger::{Ledger, MemoryLedger},
    wallet::{KeypairWallet, Wallet},
    CounterClient, ProgramInterface,
};
use solana_sdk::{pubkey::Pubkey, signature::Keypair, signer::Signer};

pub fn interface() -> ProgramInterface {
    ProgramInterface::bundled().expect("bundled IDL must load")
}

pub fn ledger() -> Arc<MemoryLedger> {
    Arc::new(MemoryLedger::new(interface()))
}

pub fn wallet() -> (Arc<dyn Wallet>, Pubkey) {
    let keypair = Keypair::new();
    let identity = keypair.pubkey();
    (Arc::new(KeypairWallet::new(keypair)), identity)
}

/// A client connected to `ledger` with a fresh wallet.
pub fn connected_client(ledger: &Arc<MemoryLedger>) -> (CounterClient, Pubkey) {
    let (wallet, identity) = wallet();
    let mut client = CounterClient::new(interface());
    client.set_ledger(Some(ledger.clone() as Arc<dyn Ledger>));
    client.set_wallet(Some(wallet));
    (client, identity)
}

pub fn counter_pda(identity: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"counter", identity.as_ref()], &interface().program_id)
}
