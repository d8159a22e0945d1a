use anchor_lang::prelude::*;

#[event]
pub struct NexusInitialized {
    pub owner: Pubkey,
    pub guardian: Pubkey,
}

#[event]
pub struct GuardianChanged {
    pub previous_guardian: Pubkey,
    pub new_guardian: Pubkey,
}

#[event]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

#[event]
pub struct PauseToggled {
    pub guardian: Pubkey,
    pub paused: bool,
}

#[event]
pub struct ProfileCreated {
    pub identity_id: u64,
    pub identity_mint: Pubkey,
    pub handler: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct ReferralAttached {
    pub handler: Pubkey,
    pub referrer: Pubkey,
    pub ancestors_updated: u8,
}

#[event]
pub struct TierChanged {
    pub handler: Pubkey,
    pub from: u8,
    pub to: u8,
    pub forced: bool,
}

#[event]
pub struct EligibilityChanged {
    pub handler: Pubkey,
    pub eligible: bool,
}

#[event]
pub struct CallExecuted {
    pub handler: Pubkey,
    pub target: Pubkey,
    pub value: u64,
    pub nonce: u64,
}

#[event]
pub struct TierConditionsUpdated {
    pub tier: u8,
    pub experience_threshold: u64,
    pub required_counts: [u32; 5],
    pub ration_limit: u32,
}

#[event]
pub struct TierConfigUpdated {
    pub magistrate: Pubkey,
    pub xp_mint: Pubkey,
}

// Emitted on every fee schedule write, `field` names what changed
#[event]
pub struct FeeScheduleUpdated {
    pub custodian: Pubkey,
    pub field: String,
}
