use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::{Transaction, TransactionError},
};
use thiserror::Error;

pub mod memory;
pub mod rpc;

pub use memory::MemoryLedger;
pub use rpc::RpcLedger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("RPC request failed: {0}")]
    Rpc(#[from] Box<ClientError>),
    #[error("transaction failed: {0}")]
    Transaction(#[from] TransactionError),
}

impl From<ClientError> for LedgerError {
    fn from(error: ClientError) -> Self {
        // Keep program failures distinguishable from transport failures.
        match error.get_transaction_error() {
            Some(transaction_error) => Self::Transaction(transaction_error),
            None => Self::Rpc(Box::new(error)),
        }
    }
}

/// The remote system of record for counter accounts.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// `Ok(None)` when no account exists at `address`.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError>;

    /// Submit a signed transaction and wait until it lands.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError>;
}
