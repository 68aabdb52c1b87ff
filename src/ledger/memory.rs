use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    hash::{hashv, Hash},
    instruction::InstructionError,
    pubkey::Pubkey,
    rent::Rent,
    signature::Signature,
    system_program,
    transaction::{Transaction, TransactionError},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::{Ledger, LedgerError};
use crate::{
    error::{
        ACCOUNT_ALREADY_IN_USE, ACCOUNT_DID_NOT_DESERIALIZE, ACCOUNT_NOT_INITIALIZED,
        CONSTRAINT_HAS_ONE, CONSTRAINT_SEEDS,
    },
    instruction::CounterInstruction,
    interface::ProgramInterface,
    pda::AddressDeriver,
    state::{self, CounterRecord},
};

/// An in-process ledger that runs the counter program's rules directly.
///
/// Transactions are applied atomically: instructions run against a scratch
/// copy of the account map, which replaces the live one only when all of them
/// succeed.
pub struct MemoryLedger {
    interface: ProgramInterface,
    deriver: AddressDeriver,
    accounts: RwLock<HashMap<Pubkey, Account>>,
    slot: AtomicU64,
}

struct KeyedAccount {
    key: Pubkey,
    is_signer: bool,
}

impl MemoryLedger {
    pub fn new(interface: ProgramInterface) -> Self {
        Self {
            deriver: AddressDeriver::new(interface.program_id),
            interface,
            accounts: RwLock::new(HashMap::new()),
            slot: AtomicU64::new(0),
        }
    }

    /// Store an account as-is, bypassing the program.
    pub async fn set_account(&self, address: Pubkey, account: Account) {
        self.accounts.write().await.insert(address, account);
    }

    /// Number of transactions applied so far.
    pub fn slot(&self) -> u64 {
        self.slot.load(Ordering::SeqCst)
    }

    fn execute(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        instruction: CounterInstruction,
        keyed: &[KeyedAccount],
    ) -> Result<(), InstructionError> {
        match instruction {
            CounterInstruction::Initialize => self.process_initialize(accounts, keyed),
            CounterInstruction::Increment => self.process_increment(accounts, keyed),
        }
    }

    fn process_initialize(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        keyed: &[KeyedAccount],
    ) -> Result<(), InstructionError> {
        let [counter_account, authority, system] = keyed else {
            return Err(InstructionError::NotEnoughAccountKeys);
        };
        if !authority.is_signer {
            return Err(InstructionError::MissingRequiredSignature);
        }
        if system.key != system_program::ID {
            return Err(InstructionError::IncorrectProgramId);
        }

        // Check to ensure that the counter lives at the authority's PDA
        if !self.deriver.verify(&authority.key, &counter_account.key) {
            return Err(InstructionError::Custom(CONSTRAINT_SEEDS));
        }

        // Creation fails like the system program does when the address is taken,
        // but a pre-funded address is topped up and taken over
        let prefunded = match accounts.get(&counter_account.key) {
            Some(existing) if state::is_vacant(existing) => existing.lamports,
            Some(_) => return Err(InstructionError::Custom(ACCOUNT_ALREADY_IN_USE)),
            None => 0,
        };

        let data = CounterRecord::new(authority.key).pack(&self.interface.counter_account);
        let account = Account {
            lamports: prefunded.max(Rent::default().minimum_balance(data.len())),
            data,
            owner: self.interface.program_id,
            executable: false,
            rent_epoch: 0,
        };
        accounts.insert(counter_account.key, account);
        debug!(counter = %counter_account.key, authority = %authority.key, "Counter created");
        Ok(())
    }

    fn process_increment(
        &self,
        accounts: &mut HashMap<Pubkey, Account>,
        keyed: &[KeyedAccount],
    ) -> Result<(), InstructionError> {
        let [counter_account, authority] = keyed else {
            return Err(InstructionError::NotEnoughAccountKeys);
        };
        if !authority.is_signer {
            return Err(InstructionError::MissingRequiredSignature);
        }

        let account = accounts
            .get_mut(&counter_account.key)
            .ok_or(InstructionError::Custom(ACCOUNT_NOT_INITIALIZED))?;
        if account.owner != self.interface.program_id {
            return Err(InstructionError::IllegalOwner);
        }
        let mut counter_data =
            CounterRecord::unpack(&account.data, &self.interface.counter_account)
                .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_DESERIALIZE))?;

        // Constraints are checked in declaration order: seeds, then has_one
        if !self.deriver.verify(&authority.key, &counter_account.key) {
            return Err(InstructionError::Custom(CONSTRAINT_SEEDS));
        }
        if counter_data.authority != authority.key {
            return Err(InstructionError::Custom(CONSTRAINT_HAS_ONE));
        }

        counter_data.count = counter_data
            .count
            .checked_add(1)
            .ok_or(InstructionError::ArithmeticOverflow)?;
        account.data = counter_data.pack(&self.interface.counter_account);
        debug!(counter = %counter_account.key, count = counter_data.count, "Counter incremented");
        Ok(())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        Ok(self.accounts.read().await.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash, LedgerError> {
        Ok(hashv(&[b"memory-ledger".as_slice(), &self.slot().to_le_bytes()]))
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, LedgerError> {
        let message = &tx.message;
        let Some(&signature) = tx.signatures.first() else {
            return Err(TransactionError::SignatureFailure.into());
        };
        if tx.signatures.len() != message.header.num_required_signatures as usize {
            return Err(TransactionError::SignatureFailure.into());
        }
        tx.verify()?;

        // Holding the write lock for the whole transaction keeps it atomic
        let mut accounts = self.accounts.write().await;
        let mut scratch = accounts.clone();

        for (index, compiled) in message.instructions.iter().enumerate() {
            let fail =
                |error: InstructionError| TransactionError::InstructionError(index as u8, error);
            let program_id = message
                .account_keys
                .get(compiled.program_id_index as usize)
                .ok_or(TransactionError::AccountNotFound)?;
            if *program_id != self.interface.program_id {
                return Err(fail(InstructionError::IncorrectProgramId).into());
            }

            let keyed = compiled
                .accounts
                .iter()
                .map(|&account_index| {
                    let account_index = account_index as usize;
                    message
                        .account_keys
                        .get(account_index)
                        .map(|key| KeyedAccount {
                            key: *key,
                            is_signer: message.is_signer(account_index),
                        })
                        .ok_or_else(|| fail(InstructionError::NotEnoughAccountKeys))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let instruction = CounterInstruction::unpack(&self.interface, &compiled.data)
                .map_err(|_| fail(InstructionError::InvalidInstructionData))?;
            self.execute(&mut scratch, instruction, &keyed).map_err(fail)?;
        }

        *accounts = scratch;
        let slot = self.slot.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(slot, %signature, "Transaction applied");
        Ok(signature)
    }
}
