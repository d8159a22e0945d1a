use anchor_lang::prelude::*;

use crate::errors::NexusError;

/// Protocol coordinator. Seeds: [b"nexus"]
#[account]
#[derive(InitSpace)]
pub struct NexusState {
    /// Protocol owner, controls eligibility and tier overrides
    pub owner: Pubkey,

    /// Creates profiles, may pause and override tiers
    pub guardian: Pubkey,

    /// Coarse gate on every mutating instruction
    pub paused: bool,

    /// Number of profiles created, also the last identity id issued
    pub profile_count: u64,

    /// Bump seed for PDA
    pub bump: u8,
}

impl NexusState {
    pub fn require_active(&self) -> Result<()> {
        require!(!self.paused, NexusError::ProtocolPaused);
        Ok(())
    }

    /// Guardian and owner may both force a tier.
    pub fn is_tier_authority(&self, key: &Pubkey) -> bool {
        *key == self.guardian || *key == self.owner
    }

    pub fn next_identity_id(&self) -> Result<u64> {
        self.profile_count
            .checked_add(1)
            .ok_or_else(|| error!(NexusError::MathOverflow))
    }

    /// Claims `identity_id` when it is the next one in sequence.
    pub fn register_identity(&mut self, identity_id: u64) -> Result<()> {
        let expected = self.next_identity_id()?;
        require_eq!(identity_id, expected, NexusError::IdentityOutOfSequence);
        self.profile_count = expected;
        Ok(())
    }
}
