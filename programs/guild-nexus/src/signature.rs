use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    ed25519_program::ID as ED25519_ID,
    instruction::Instruction,
    sysvar::instructions::{load_current_index_checked, load_instruction_at_checked},
};

use crate::constants::{
    ED25519_HEADER_LEN, ED25519_PUBKEY_LEN, ED25519_SIG_LEN, INVALID_SIGNATURE_MAGIC,
    VALID_SIGNATURE_MAGIC, VALID_SIGNER_MAGIC,
};

/// Outcome of a signature check. Never an error: a bad signature is a value.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid = VALID_SIGNATURE_MAGIC,
    Invalid = INVALID_SIGNATURE_MAGIC,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignerCheck {
    Valid = VALID_SIGNER_MAGIC,
    Invalid = INVALID_SIGNATURE_MAGIC,
}

impl SignatureCheck {
    pub fn magic(self) -> u32 {
        self as u32
    }
}

impl SignerCheck {
    pub fn magic(self) -> u32 {
        self as u32
    }
}

const PUBKEY_OFFSET: usize = ED25519_HEADER_LEN;
const SIG_OFFSET: usize = PUBKEY_OFFSET + ED25519_PUBKEY_LEN;
const MSG_OFFSET: usize = SIG_OFFSET + ED25519_SIG_LEN;

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// True when `ix` is an Ed25519 verify instruction over exactly
/// (`pubkey`, `message`, `sig`) with all data inline.
pub fn ed25519_ix_matches(ix: &Instruction, pubkey: &Pubkey, message: &[u8], sig: &[u8]) -> bool {
    if ix.program_id != ED25519_ID || !ix.accounts.is_empty() {
        return false;
    }
    let data = &ix.data;
    if data.len() != MSG_OFFSET + message.len() || sig.len() != ED25519_SIG_LEN {
        return false;
    }

    // Header: one signature, every offset pointing into this instruction
    let Ok(message_len) = u16::try_from(message.len()) else {
        return false;
    };
    let header = [
        (2, SIG_OFFSET as u16),
        (4, u16::MAX),
        (6, PUBKEY_OFFSET as u16),
        (8, u16::MAX),
        (10, MSG_OFFSET as u16),
        (12, message_len),
        (14, u16::MAX),
    ];
    if data[0] != 1 || data[1] != 0 {
        return false;
    }
    if header
        .iter()
        .any(|(at, expected)| read_u16(data, *at) != Some(*expected))
    {
        return false;
    }

    &data[PUBKEY_OFFSET..SIG_OFFSET] == pubkey.as_ref()
        && &data[SIG_OFFSET..MSG_OFFSET] == sig
        && &data[MSG_OFFSET..] == message
}

/// Checks that the instruction right before the current one verified `sig`
/// by `owner` over `digest`.
pub fn check_signature(
    instructions_sysvar: &AccountInfo,
    owner: &Pubkey,
    digest: &[u8; 32],
    sig: &[u8],
) -> Result<SignatureCheck> {
    let current = load_current_index_checked(instructions_sysvar)?;
    let Some(previous) = current.checked_sub(1) else {
        return Ok(SignatureCheck::Invalid);
    };
    let ix = load_instruction_at_checked(previous as usize, instructions_sysvar)?;

    if ed25519_ix_matches(&ix, owner, digest, sig) {
        Ok(SignatureCheck::Valid)
    } else {
        Ok(SignatureCheck::Invalid)
    }
}

pub fn check_signer(owner: &Pubkey, candidate: &Pubkey) -> SignerCheck {
    if candidate == owner {
        SignerCheck::Valid
    } else {
        SignerCheck::Invalid
    }
}
