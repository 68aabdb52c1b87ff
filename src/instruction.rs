// instruction.rs
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::interface::ProgramInterface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterInstruction {
    Initialize,
    Increment,
}

impl CounterInstruction {
    pub fn unpack(interface: &ProgramInterface, input: &[u8]) -> Result<Self, ProgramError> {
        // Anchor instructions start with an 8-byte discriminator
        if input.len() < 8 {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (ix_discriminator, _args) = input.split_at(8);

        // Neither instruction takes arguments; trailing bytes are ignored like Anchor does
        if ix_discriminator == interface.initialize {
            Ok(Self::Initialize)
        } else if ix_discriminator == interface.increment {
            Ok(Self::Increment)
        } else {
            Err(ProgramError::InvalidInstructionData)
        }
    }

    pub fn data(&self, interface: &ProgramInterface) -> Vec<u8> {
        match self {
            Self::Initialize => interface.initialize.to_vec(),
            Self::Increment => interface.increment.to_vec(),
        }
    }
}

/// Create the counter at `counter`, paid for and owned by `authority`.
pub fn initialize(interface: &ProgramInterface, counter: &Pubkey, authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: interface.program_id,
        accounts: vec![
            AccountMeta::new(*counter, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: CounterInstruction::Initialize.data(interface),
    }
}

/// Add one to the counter at `counter`, signed by `authority`.
pub fn increment(interface: &ProgramInterface, counter: &Pubkey, authority: &Pubkey) -> Instruction {
    Instruction {
        program_id: interface.program_id,
        accounts: vec![
            AccountMeta::new(*counter, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: CounterInstruction::Increment.data(interface),
    }
}
