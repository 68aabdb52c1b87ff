use std::sync::Arc;

use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use tracing::{debug, info};

use crate::{
    error::{CounterError, UnavailableError},
    instruction,
    interface::ProgramInterface,
    ledger::Ledger,
    pda::AddressDeriver,
    state::{self, CounterRecord},
    wallet::Wallet,
};

/// What the ledger holds at a counter address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterState {
    Initialized(CounterRecord),
    Uninitialized,
}

impl CounterState {
    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Initialized(record) => Some(record.count),
            Self::Uninitialized => None,
        }
    }
}

/// Reads and mutates the connected identity's counter.
///
/// Every operation returns `Ok(None)` without touching the ledger while either
/// the ledger handle or the wallet identity is missing.
pub struct CounterClient {
    interface: ProgramInterface,
    deriver: AddressDeriver,
    ledger: Option<Arc<dyn Ledger>>,
    wallet: Option<Arc<dyn Wallet>>,
}

struct Connection<'a> {
    ledger: &'a dyn Ledger,
    wallet: &'a dyn Wallet,
    identity: Pubkey,
}

impl CounterClient {
    pub fn new(interface: ProgramInterface) -> Self {
        Self {
            deriver: AddressDeriver::new(interface.program_id),
            interface,
            ledger: None,
            wallet: None,
        }
    }

    pub fn interface(&self) -> &ProgramInterface {
        &self.interface
    }

    pub fn set_ledger(&mut self, ledger: Option<Arc<dyn Ledger>>) {
        self.ledger = ledger;
    }

    pub fn set_wallet(&mut self, wallet: Option<Arc<dyn Wallet>>) {
        self.wallet = wallet;
    }

    pub fn ledger(&self) -> Option<&Arc<dyn Ledger>> {
        self.ledger.as_ref()
    }

    pub fn has_ledger(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn identity(&self) -> Option<Pubkey> {
        self.wallet.as_ref().and_then(|wallet| wallet.identity())
    }

    /// The connected identity's counter address and bump.
    pub fn counter_address(&self) -> Result<(Pubkey, u8), CounterError> {
        self.deriver.derive(self.identity().as_ref())
    }

    fn connection(&self) -> Option<Connection<'_>> {
        let ledger = self.ledger.as_deref()?;
        let wallet = self.wallet.as_deref()?;
        let identity = wallet.identity()?;
        Some(Connection {
            ledger,
            wallet,
            identity,
        })
    }

    pub async fn fetch(&self) -> Result<Option<CounterState>, CounterError> {
        let Some(connection) = self.connection() else {
            return Ok(None);
        };
        let (address, _bump) = self.deriver.derive_for(&connection.identity);
        self.fetch_at(connection.ledger, address).await.map(Some)
    }

    pub async fn initialize(&self) -> Result<Option<CounterState>, CounterError> {
        let Some(connection) = self.connection() else {
            return Ok(None);
        };
        let (address, _bump) = self.deriver.derive_for(&connection.identity);
        let ix = instruction::initialize(&self.interface, &address, &connection.identity);
        let signature = self.submit(&connection, address, ix).await?;
        info!(%address, %signature, "Counter initialized");
        self.fetch_at(connection.ledger, address).await.map(Some)
    }

    pub async fn increment(&self) -> Result<Option<CounterState>, CounterError> {
        match self.identity() {
            Some(identity) => self.increment_owned_by(&identity).await,
            None => Ok(None),
        }
    }

    /// Increment the counter derived from `owner`, signing as the connected identity.
    ///
    /// The ledger only accepts this when the connected identity is the
    /// counter's authority.
    pub async fn increment_owned_by(
        &self,
        owner: &Pubkey,
    ) -> Result<Option<CounterState>, CounterError> {
        let Some(connection) = self.connection() else {
            return Ok(None);
        };
        let (address, _bump) = self.deriver.derive_for(owner);
        let ix = instruction::increment(&self.interface, &address, &connection.identity);
        let signature = self.submit(&connection, address, ix).await?;
        info!(%address, %signature, "Counter incremented");
        self.fetch_at(connection.ledger, address).await.map(Some)
    }

    async fn fetch_at(&self, ledger: &dyn Ledger, address: Pubkey) -> Result<CounterState, CounterError> {
        let account = ledger
            .get_account(&address)
            .await
            .map_err(UnavailableError::Ledger)?;
        let Some(account) = account.filter(|account| !state::is_vacant(account)) else {
            debug!(%address, "Counter not initialized yet");
            return Ok(CounterState::Uninitialized);
        };
        let record = CounterRecord::unpack(&account.data, &self.interface.counter_account)
            .map_err(|source| UnavailableError::Decode { address, source })?;
        debug!(%address, count = record.count, "Fetched counter");
        Ok(CounterState::Initialized(record))
    }

    async fn submit(
        &self,
        connection: &Connection<'_>,
        address: Pubkey,
        ix: Instruction,
    ) -> Result<Signature, CounterError> {
        let blockhash = connection
            .ledger
            .latest_blockhash()
            .await
            .map_err(UnavailableError::Ledger)?;
        let mut tx = Transaction::new_with_payer(&[ix], Some(&connection.identity));
        connection.wallet.sign_transaction(&mut tx, blockhash)?;
        connection
            .ledger
            .send_transaction(&tx)
            .await
            .map_err(|error| CounterError::from_submission(error, connection.identity, address))
    }
}
