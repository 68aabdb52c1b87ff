pub mod client; // fetch / initialize / increment against the derived counter address
pub mod controller; // view state and the connection state machine
pub mod error; // error kinds surfaced to callers
pub mod instruction; // how counter instructions are encoded and decoded
pub mod interface; // program id and discriminators loaded from the IDL
pub mod ledger; // remote ledger abstraction with RPC and in-memory backends
pub mod pda; // counter address derivation
pub mod state; // on-chain counter account layout
pub mod wallet; // identity and signing capability

pub use client::{CounterClient, CounterState};
pub use controller::{Action, Controller, Event, Phase, View};
pub use error::{CounterError, UnavailableError};
pub use interface::ProgramInterface;
pub use pda::{AddressDeriver, COUNTER_SEED};
pub use state::CounterRecord;
