use solana_program::pubkey::Pubkey;

use crate::error::CounterError;

/// Tag mixed into every counter address.
pub const COUNTER_SEED: &[u8] = b"counter";

/// Derives the counter address owned by an identity.
///
/// Derivation is a pure hash over `[tag, identity]` and the program id, so the
/// same identity always maps to the same address and bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressDeriver {
    program_id: Pubkey,
    tag: &'static [u8],
}

impl AddressDeriver {
    pub fn new(program_id: Pubkey) -> Self {
        Self::with_tag(program_id, COUNTER_SEED)
    }

    pub fn with_tag(program_id: Pubkey, tag: &'static [u8]) -> Self {
        Self { program_id, tag }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn tag(&self) -> &'static [u8] {
        self.tag
    }

    /// Derive the address for the connected identity, if there is one.
    pub fn derive(&self, identity: Option<&Pubkey>) -> Result<(Pubkey, u8), CounterError> {
        identity
            .map(|identity| self.derive_for(identity))
            .ok_or(CounterError::IdentityUnavailable)
    }

    pub fn derive_for(&self, identity: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[self.tag, identity.as_ref()], &self.program_id)
    }

    /// Check that `address` is the canonical derivation for `identity`.
    pub fn verify(&self, identity: &Pubkey, address: &Pubkey) -> bool {
        self.derive_for(identity).0 == *address
    }
}
