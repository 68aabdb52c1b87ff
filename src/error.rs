use solana_program::pubkey::Pubkey;
use solana_sdk::{instruction::InstructionError, transaction::TransactionError};
use thiserror::Error;

use crate::{ledger::LedgerError, state::StateError, wallet::WalletError};

/// System program: the target account already exists.
pub const ACCOUNT_ALREADY_IN_USE: u32 = 0;
/// Anchor: a `has_one` constraint did not match.
pub const CONSTRAINT_HAS_ONE: u32 = 2001;
/// Anchor: a `seeds` constraint did not match.
pub const CONSTRAINT_SEEDS: u32 = 2006;
/// Anchor: the account discriminator could not be read.
pub const ACCOUNT_DID_NOT_DESERIALIZE: u32 = 3003;
/// Anchor: the account has not been created yet.
pub const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("wallet not connected")]
    IdentityUnavailable,
    #[error("counter unavailable: {0}")]
    Unavailable(#[from] UnavailableError),
    #[error("{identity} is not the authority of counter {address}")]
    Authorization { identity: Pubkey, address: Pubkey },
    #[error("counter {address} is already initialized")]
    AlreadyInitialized { address: Pubkey },
    #[error("counter {address} is not initialized")]
    NotInitialized { address: Pubkey },
    #[error("transaction rejected: {0}")]
    Rejected(TransactionError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// The ledger could not be reached, or returned something that is not a counter.
#[derive(Debug, Error)]
pub enum UnavailableError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("account {address} does not hold a counter: {source}")]
    Decode {
        address: Pubkey,
        #[source]
        source: StateError,
    },
}

impl CounterError {
    /// Classify a failed submission made by `identity` against `address`.
    pub fn from_submission(error: LedgerError, identity: Pubkey, address: Pubkey) -> Self {
        let LedgerError::Transaction(transaction_error) = error else {
            return UnavailableError::Ledger(error).into();
        };
        match &transaction_error {
            TransactionError::InstructionError(_, instruction_error) => match instruction_error {
                InstructionError::Custom(CONSTRAINT_HAS_ONE | CONSTRAINT_SEEDS)
                | InstructionError::MissingRequiredSignature => {
                    Self::Authorization { identity, address }
                }
                InstructionError::Custom(ACCOUNT_ALREADY_IN_USE)
                | InstructionError::AccountAlreadyInitialized => {
                    Self::AlreadyInitialized { address }
                }
                InstructionError::Custom(ACCOUNT_NOT_INITIALIZED)
                | InstructionError::UninitializedAccount => Self::NotInitialized { address },
                _ => Self::Rejected(transaction_error),
            },
            _ => Self::Rejected(transaction_error),
        }
    }
}
