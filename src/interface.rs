use std::{path::Path, str::FromStr};

use serde::Deserialize;
use solana_program::pubkey::{ParsePubkeyError, Pubkey};
use thiserror::Error;

pub type Discriminator = [u8; 8];

const BUNDLED_IDL: &str = include_str!("../idl/pda_counter.json");

pub const INITIALIZE: &str = "initialize";
pub const INCREMENT: &str = "increment";
pub const COUNTER_ACCOUNT: &str = "Counter";

#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("failed to read IDL {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed IDL: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid program address in IDL: {0}")]
    Address(#[from] ParsePubkeyError),
    #[error("IDL has no instruction named `{0}`")]
    MissingInstruction(&'static str),
    #[error("IDL has no account named `{0}`")]
    MissingAccount(&'static str),
    #[error("IDL has no type definition for `{0}`")]
    MissingType(&'static str),
    #[error("`{0}` discriminator must be 8 bytes")]
    Discriminator(String),
    #[error("`Counter` fields are {0:?}, expected [count: u64, authority: pubkey]")]
    Layout(Vec<(String, String)>),
}

// Only the parts of an Anchor IDL that the client relies on.
#[derive(Deserialize)]
struct Idl {
    address: String,
    #[serde(default)]
    instructions: Vec<IdlEntry>,
    #[serde(default)]
    accounts: Vec<IdlEntry>,
    #[serde(default)]
    types: Vec<IdlTypeDef>,
}

#[derive(Deserialize)]
struct IdlEntry {
    name: String,
    discriminator: Vec<u8>,
}

#[derive(Deserialize)]
struct IdlTypeDef {
    name: String,
    #[serde(rename = "type")]
    ty: IdlTypeBody,
}

#[derive(Deserialize)]
struct IdlTypeBody {
    #[serde(default)]
    fields: Vec<IdlField>,
}

#[derive(Deserialize)]
struct IdlField {
    name: String,
    #[serde(rename = "type")]
    ty: serde_json::Value,
}

/// The program id and the discriminators the client needs to talk to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramInterface {
    pub program_id: Pubkey,
    pub initialize: Discriminator,
    pub increment: Discriminator,
    pub counter_account: Discriminator,
}

impl ProgramInterface {
    /// The interface shipped with the crate.
    pub fn bundled() -> Result<Self, InterfaceError> {
        Self::from_json(BUNDLED_IDL)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InterfaceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| InterfaceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, InterfaceError> {
        let idl: Idl = serde_json::from_str(json)?;
        let program_id = Pubkey::from_str(&idl.address)?;
        let initialize = find(&idl.instructions, INITIALIZE)
            .ok_or(InterfaceError::MissingInstruction(INITIALIZE))??;
        let increment = find(&idl.instructions, INCREMENT)
            .ok_or(InterfaceError::MissingInstruction(INCREMENT))??;
        let counter_account = find(&idl.accounts, COUNTER_ACCOUNT)
            .ok_or(InterfaceError::MissingAccount(COUNTER_ACCOUNT))??;
        check_counter_layout(&idl.types)?;

        Ok(Self {
            program_id,
            initialize,
            increment,
            counter_account,
        })
    }

    /// Same interface, deployed at another address.
    pub fn with_program_id(self, program_id: Pubkey) -> Self {
        Self { program_id, ..self }
    }
}

fn find(entries: &[IdlEntry], name: &str) -> Option<Result<Discriminator, InterfaceError>> {
    entries.iter().find(|entry| entry.name == name).map(|entry| {
        Discriminator::try_from(entry.discriminator.as_slice())
            .map_err(|_| InterfaceError::Discriminator(entry.name.clone()))
    })
}

// Account layout is fixed by `CounterRecord`; an IDL describing anything else
// would make every fetch fail to decode.
fn check_counter_layout(types: &[IdlTypeDef]) -> Result<(), InterfaceError> {
    let counter = types
        .iter()
        .find(|def| def.name == COUNTER_ACCOUNT)
        .ok_or(InterfaceError::MissingType(COUNTER_ACCOUNT))?;
    let fields: Vec<(String, String)> = counter
        .ty
        .fields
        .iter()
        .map(|field| {
            let ty = match &field.ty {
                serde_json::Value::String(ty) => ty.clone(),
                other => other.to_string(),
            };
            (field.name.clone(), ty)
        })
        .collect();
    let expected = [("count", "u64"), ("authority", "pubkey")];
    let matches = fields.len() == expected.len()
        && fields
            .iter()
            .zip(expected)
            .all(|((name, ty), (want_name, want_ty))| name == want_name && ty == want_ty);
    if matches {
        Ok(())
    } else {
        Err(InterfaceError::Layout(fields))
    }
}
