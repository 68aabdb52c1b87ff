use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use std::sync::Arc;
use tracing::debug;

use super::{Ledger, LedgerError};

/// A ledger reached over JSON-RPC.
#[derive(Clone)]
pub struct RpcLedger {
    client: Arc<RpcClient>,
}

impl RpcLedger {
    pub fn new(rpc_url: &str, commitment: CommitmentConfig) -> Self {
        Self::from_client(Arc::new(RpcClient::new_with_commitment(
            rpc_url.to_string(),
            commitment,
        )))
    }

    pub fn from_client(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        debug!(%address, slot = response.context.slot, found = response.value.is_some(), "Fetched account");
        Ok(response.value)
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        Ok(self.client.send_and_confirm_transaction(tx).await?)
    }
}
