use anchor_lang::prelude::*;

use crate::{errors::NexusError, referral::TierCounts, state::TierConfig};

/// Per-identity account. Seeds: [b"handler", identity_id.to_le_bytes()]
///
/// The owner is never stored here; it is whoever holds the identity token.
/// Fields are private so that each one keeps a single writer: tier and
/// eligibility change through the methods below, `tier_counts` only through
/// the referral walks.
#[account]
#[derive(InitSpace)]
pub struct AccountHandler {
    /// Identity this account is bound to
    identity_id: u64,

    /// Mint of the identity token (supply 1)
    identity_mint: Pubkey,

    /// Account that introduced this one, set once at creation
    referred_by: Option<Pubkey>,

    /// Current tier level, starts at 1
    tier: u8,

    /// Descendants within the depth cap, per classification rank
    tier_counts: TierCounts,

    /// Promotion gate controlled by the protocol owner
    eligible_for_tier_up: bool,

    /// Bumped once per attempted outbound call
    execution_nonce: u64,

    /// Bump seed for the handler PDA
    bump: u8,

    /// Bump seed for the vault PDA
    vault_bump: u8,
}

/// Binds an identity mint to its account. Seeds: [b"identity", identity_mint]
///
/// Created together with the handler, so a mint can back one account only.
#[account]
#[derive(InitSpace)]
pub struct IdentityLink {
    pub identity_id: u64,

    pub handler: Pubkey,

    /// Bump seed for PDA
    pub bump: u8,
}

impl IdentityLink {
    /// A mint can back an account only while its single token can never be
    /// joined by a second one.
    pub fn accepts_mint(supply: u64, decimals: u8, has_mint_authority: bool) -> bool {
        supply == 1 && decimals == 0 && !has_mint_authority
    }
}

/// A tier move from `from` to `to`, handed to the referral walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierTransition {
    pub from: u8,
    pub to: u8,
}

impl AccountHandler {
    pub fn new(identity_id: u64, identity_mint: Pubkey, bump: u8, vault_bump: u8) -> Self {
        Self {
            identity_id,
            identity_mint,
            referred_by: None,
            tier: 1,
            tier_counts: TierCounts::default(),
            eligible_for_tier_up: true,
            execution_nonce: 0,
            bump,
            vault_bump,
        }
    }

    pub fn identity_id(&self) -> u64 {
        self.identity_id
    }

    pub fn identity_mint(&self) -> Pubkey {
        self.identity_mint
    }

    /// Identity id and mint the account is bound to.
    pub fn token(&self) -> (u64, Pubkey) {
        (self.identity_id, self.identity_mint)
    }

    pub fn referred_by(&self) -> Option<Pubkey> {
        self.referred_by
    }

    pub fn tier(&self) -> u8 {
        self.tier
    }

    pub fn tier_counts(&self) -> &TierCounts {
        &self.tier_counts
    }

    pub fn eligible_for_tier_up(&self) -> bool {
        self.eligible_for_tier_up
    }

    pub fn execution_nonce(&self) -> u64 {
        self.execution_nonce
    }

    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn vault_bump(&self) -> u8 {
        self.vault_bump
    }

    pub(crate) fn tier_counts_mut(&mut self) -> &mut TierCounts {
        &mut self.tier_counts
    }

    pub(crate) fn link_referrer(&mut self, referrer: Pubkey) -> Result<()> {
        require!(self.referred_by.is_none(), NexusError::AlreadyLinked);
        self.referred_by = Some(referrer);
        Ok(())
    }

    /// Moves up exactly one tier when the account is eligible and meets the
    /// conditions of the next tier.
    pub fn promote(&mut self, config: &TierConfig, experience: u64) -> Result<TierTransition> {
        require!(self.eligible_for_tier_up, NexusError::NotEligible);
        require!(
            config.can_promote(self.tier, experience, &self.tier_counts),
            NexusError::ConditionNotMet
        );

        let transition = TierTransition {
            from: self.tier,
            to: self.tier + 1,
        };
        self.tier = transition.to;
        Ok(transition)
    }

    /// Authoritative move to `new_tier`, skipping eligibility and conditions.
    pub fn override_tier(&mut self, config: &TierConfig, new_tier: u8) -> Result<TierTransition> {
        require!(new_tier > self.tier, NexusError::InvalidTransition);
        require!(new_tier <= config.max_tier(), NexusError::TierOutOfRange);

        let transition = TierTransition {
            from: self.tier,
            to: new_tier,
        };
        self.tier = new_tier;
        Ok(transition)
    }

    pub fn set_eligibility(&mut self, eligible: bool) {
        self.eligible_for_tier_up = eligible;
    }

    /// Consumes the current nonce for an outbound call and returns it.
    pub fn next_nonce(&mut self) -> Result<u64> {
        let nonce = self.execution_nonce;
        self.execution_nonce = nonce.checked_add(1).ok_or(NexusError::MathOverflow)?;
        Ok(nonce)
    }
}
