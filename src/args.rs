use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pda_counter::ProgramInterface;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{path::PathBuf, str::FromStr};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(long, help = "Solana cluster RPC URL")]
    pub cluster: Option<String>,
    #[arg(long, help = "Commitment level: processed, confirmed or finalized")]
    pub commitment: Option<String>,
    #[arg(long, help = "Path to the wallet keypair file")]
    pub keypair: Option<PathBuf>,
    #[arg(long, help = "Counter program id, overriding the IDL address")]
    pub program_id: Option<String>,
    #[arg(long, help = "Path to the counter program IDL")]
    pub idl: Option<PathBuf>,
    #[arg(long, help = "Run against an in-memory ledger instead of a cluster")]
    pub offline: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the counter address derived for the wallet
    Address,
    /// Fetch and print the counter
    Show,
    /// Create the counter
    Initialize,
    /// Add one to the counter
    Increment {
        #[arg(long, default_value_t = 1)]
        times: u64,
    },
    /// Drive the counter view from stdin
    Interactive,
}

// Flags win over the environment, which wins over the defaults.
pub fn get_solana_cluster(cli_cluster: Option<String>) -> String {
    cli_cluster
        .or_else(|| std::env::var("SOLANA_CLUSTER").ok())
        .unwrap_or_else(|| "http://127.0.0.1:8899".to_string())
}

pub fn get_commitment(cli_commitment: Option<String>) -> Result<CommitmentConfig> {
    let commitment = cli_commitment
        .or_else(|| std::env::var("COUNTER_COMMITMENT").ok())
        .unwrap_or_else(|| "confirmed".to_string());
    CommitmentConfig::from_str(&commitment)
        .map_err(|_| anyhow::anyhow!("unknown commitment level `{commitment}`"))
}

pub fn get_keypair_path(cli_keypair: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_keypair.or_else(|| std::env::var_os("COUNTER_KEYPAIR").map(PathBuf::from)) {
        return Ok(path);
    }
    let home = std::env::var_os("HOME")
        .context("COUNTER_KEYPAIR environment variable or --keypair argument must be provided")?;
    Ok(PathBuf::from(home).join(".config/solana/id.json"))
}

pub fn get_program_interface(
    cli_idl: Option<PathBuf>,
    cli_program_id: Option<String>,
) -> Result<ProgramInterface> {
    let interface = match cli_idl.or_else(|| std::env::var_os("COUNTER_IDL").map(PathBuf::from)) {
        Some(path) => ProgramInterface::from_path(&path)?,
        None => ProgramInterface::bundled()?,
    };
    match cli_program_id.or_else(|| std::env::var("COUNTER_PROGRAM_ID").ok()) {
        Some(program_id) => {
            let program_id = Pubkey::from_str(&program_id)
                .with_context(|| format!("invalid program id `{program_id}`"))?;
            Ok(interface.with_program_id(program_id))
        }
        None => Ok(interface),
    }
}
