// state.rs
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{pubkey::Pubkey, system_program};
use solana_sdk::account::Account;
use thiserror::Error;

use crate::interface::Discriminator;

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterRecord {
    pub count: u64,
    pub authority: Pubkey,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("account data is {0} bytes, shorter than the discriminator")]
    TooShort(usize),
    #[error("unexpected account discriminator {0:?}")]
    Discriminator(Discriminator),
    #[error("malformed counter fields: {0}")]
    Fields(#[from] std::io::Error),
}

impl CounterRecord {
    /// Serialized fields, without the discriminator.
    pub const SIZE: usize = 8 + 32;
    /// Full account size including the discriminator.
    pub const ACCOUNT_SIZE: usize = 8 + Self::SIZE;

    pub fn new(authority: Pubkey) -> Self {
        Self {
            count: 0,
            authority,
        }
    }

    /// Decode account data, checking the discriminator first.
    ///
    /// Trailing bytes past the fields are ignored, the same way Anchor reads
    /// accounts that were allocated with extra space.
    pub fn unpack(data: &[u8], discriminator: &Discriminator) -> Result<Self, StateError> {
        if data.len() < discriminator.len() {
            return Err(StateError::TooShort(data.len()));
        }
        let (tag, mut rest) = data.split_at(discriminator.len());
        if tag != discriminator {
            let mut found = Discriminator::default();
            found.copy_from_slice(tag);
            return Err(StateError::Discriminator(found));
        }
        Ok(Self::deserialize(&mut rest)?)
    }

    pub fn pack(&self, discriminator: &Discriminator) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::ACCOUNT_SIZE);
        data.extend_from_slice(discriminator);
        self.serialize(&mut data)
            .expect("serializing into a Vec is infallible");
        data
    }
}

/// An address that only holds lamports, e.g. a PDA someone transferred to
/// before the counter was created. Anchor `init` still accepts it.
pub fn is_vacant(account: &Account) -> bool {
    account.data.is_empty() && account.owner == system_program::ID
}
