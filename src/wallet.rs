use std::path::Path;

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::{Signer, SignerError},
    transaction::Transaction,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("failed to load keypair from {path}: {reason}")]
    Keypair { path: String, reason: String },
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] SignerError),
}

/// The wallet adapter boundary: an identity plus the ability to sign with it.
///
/// Key material never leaves the implementation.
pub trait Wallet: Send + Sync {
    fn identity(&self) -> Option<Pubkey>;

    fn sign_transaction(&self, tx: &mut Transaction, blockhash: Hash) -> Result<(), WalletError>;
}

/// A wallet backed by a local keypair, e.g. the Solana CLI's `id.json`.
pub struct KeypairWallet {
    keypair: Keypair,
}

// Manual impl so the secret key is never printed.
impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path).map_err(|e| WalletError::Keypair {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(keypair))
    }
}

impl Wallet for KeypairWallet {
    fn identity(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn sign_transaction(&self, tx: &mut Transaction, blockhash: Hash) -> Result<(), WalletError> {
        tx.try_sign(&[&self.keypair], blockhash)?;
        Ok(())
    }
}
