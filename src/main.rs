mod args;

use anyhow::{bail, Result};
use clap::Parser;
use pda_counter::{
    ledger::{Ledger, MemoryLedger, RpcLedger},
    wallet::{KeypairWallet, Wallet},
    Controller, CounterClient, Event,
};
use solana_sdk::signature::Keypair;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::args::{
    get_commitment, get_keypair_path, get_program_interface, get_solana_cluster, Args, Command,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let interface = get_program_interface(args.idl, args.program_id)?;
    let keypair_path = get_keypair_path(args.keypair)?;

    let wallet: Arc<dyn Wallet> = match KeypairWallet::from_file(&keypair_path) {
        Ok(wallet) => Arc::new(wallet),
        Err(e) if args.offline => {
            warn!(error = %e, "No keypair available, using a throwaway wallet");
            Arc::new(KeypairWallet::new(Keypair::new()))
        }
        Err(e) => return Err(e.into()),
    };

    let ledger: Arc<dyn Ledger> = if args.offline {
        info!("Using in-memory ledger");
        Arc::new(MemoryLedger::new(interface))
    } else {
        let cluster_url = get_solana_cluster(args.cluster);
        let commitment = get_commitment(args.commitment)?;
        let ledger = RpcLedger::new(&cluster_url, commitment);
        info!(cluster = %ledger.url(), commitment = ?commitment.commitment, "Using RPC ledger");
        Arc::new(ledger)
    };

    let mut controller = Controller::new(CounterClient::new(interface));
    controller.handle(Event::WalletConnected(wallet.clone())).await;
    info!(wallet_pubkey = ?controller.view().identity, "Identity initialized");

    if args.command == Command::Address {
        let (address, bump) = controller.client().counter_address()?;
        println!("{address} (bump {bump})");
        return Ok(());
    }

    controller.handle(Event::LedgerReady(ledger)).await;
    match args.command {
        Command::Address | Command::Show => {}
        Command::Initialize => controller.handle(Event::Initialize).await,
        Command::Increment { times } => {
            for _ in 0..times {
                controller.handle(Event::Increment).await;
                if controller.view().notice.is_some() {
                    break;
                }
            }
        }
        Command::Interactive => return run_interactive(&mut controller, wallet).await,
    }

    print!("{}", controller.view());
    if let Some(notice) = &controller.view().notice {
        bail!("{notice}");
    }
    Ok(())
}

async fn run_interactive(controller: &mut Controller, wallet: Arc<dyn Wallet>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("{}", controller.view());
    println!("commands: connect, disconnect, refresh, initialize, increment, dismiss, quit");

    while let Some(line) = lines.next_line().await? {
        let event = match line.trim() {
            "" => continue,
            "connect" => Event::WalletConnected(wallet.clone()),
            "disconnect" => Event::WalletDisconnected,
            "refresh" | "fetch" => Event::Refresh,
            "initialize" | "init" => Event::Initialize,
            "increment" | "inc" => Event::Increment,
            "dismiss" => Event::DismissNotice,
            "quit" | "exit" => break,
            other => {
                println!("unknown command `{other}`");
                continue;
            }
        };
        controller.handle(event).await;
        print!("{}", controller.view());
    }
    Ok(())
}
