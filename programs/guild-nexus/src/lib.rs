use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod referral;
pub mod signature;
pub mod state;

use constants::{RANK_COUNT, REFERRAL_LAYERS, REFERRAL_TIERS};
use instructions::*;
use state::{PartyFees, SeekerFees, SolverFees, Treasuries, TreasuryKind};

declare_id!("5UrVR93RFJqJ12GUuT68mWyyvsWnTS8yUKJoVBY8zc6A");

#[program]
pub mod guild_nexus {
    use super::*;

    /// Create the coordinator and make the signer its owner.
    pub fn initialize_nexus(ctx: Context<InitializeNexus>, guardian: Pubkey) -> Result<()> {
        instructions::initialize_nexus(ctx, guardian)
    }

    pub fn set_guardian(ctx: Context<OwnerOnly>, new_guardian: Pubkey) -> Result<()> {
        instructions::set_guardian(ctx, new_guardian)
    }

    pub fn transfer_ownership(ctx: Context<OwnerOnly>, new_owner: Pubkey) -> Result<()> {
        instructions::transfer_ownership(ctx, new_owner)
    }

    /// Stop every mutating instruction until unpaused.
    pub fn guardian_pause(ctx: Context<GuardianOnly>) -> Result<()> {
        instructions::set_paused(ctx, true)
    }

    pub fn guardian_unpause(ctx: Context<GuardianOnly>) -> Result<()> {
        instructions::set_paused(ctx, false)
    }

    /// Create the account bound to identity `identity_id`.
    ///
    /// When `referrer` is set, remaining accounts carry the referrer handler
    /// followed by its ancestors up to the depth cap, all writable.
    pub fn create_profile<'info>(
        ctx: Context<'_, '_, 'info, 'info, CreateProfile<'info>>,
        identity_id: u64,
        referrer: Option<Pubkey>,
    ) -> Result<()> {
        instructions::create_profile(ctx, identity_id, referrer)
    }

    /// Promote the account one tier. Signed by the identity holder.
    ///
    /// Remaining accounts: the ancestor chain starting at the referrer.
    pub fn tier_up<'info>(ctx: Context<'_, '_, 'info, 'info, TierUp<'info>>) -> Result<()> {
        instructions::tier_up(ctx)
    }

    /// Force a tier as guardian or owner, skipping the conditions.
    pub fn set_tier<'info>(
        ctx: Context<'_, '_, 'info, 'info, SetTier<'info>>,
        new_tier: u8,
    ) -> Result<()> {
        instructions::set_tier(ctx, new_tier)
    }

    pub fn change_eligibility(ctx: Context<ChangeEligibility>, eligible: bool) -> Result<()> {
        instructions::change_eligibility(ctx, eligible)
    }

    /// Run one call from the account vault.
    ///
    /// Remaining accounts: the target, then `call.account_count` accounts for
    /// the target program.
    pub fn execute<'info>(
        ctx: Context<'_, '_, 'info, 'info, Execute<'info>>,
        call: CallRequest,
    ) -> Result<()> {
        instructions::execute(ctx, call)
    }

    /// Run several calls in order. Remaining accounts are laid out per call
    /// as for `execute`, one call after another.
    pub fn execute_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, Execute<'info>>,
        calls: Vec<CallRequest>,
    ) -> Result<()> {
        instructions::execute_batch(ctx, calls)
    }

    /// Returns 0x1626ba7e if the preceding Ed25519 instruction proves the
    /// identity holder signed `digest`, 0 otherwise.
    pub fn is_valid_signature(
        ctx: Context<SignatureQuery>,
        digest: [u8; 32],
        signature: Vec<u8>,
    ) -> Result<u32> {
        instructions::is_valid_signature(ctx, digest, signature)
    }

    /// Returns 0x523e3260 if `candidate` holds the identity token, 0 otherwise.
    pub fn is_valid_signer(
        ctx: Context<SignatureQuery>,
        candidate: Pubkey,
        context: Vec<u8>,
    ) -> Result<u32> {
        instructions::is_valid_signer(ctx, candidate, context)
    }

    /// Remaining accounts: ancestors at generations 1..depth-1.
    pub fn check_ancestor_at<'info>(
        ctx: Context<'_, '_, 'info, 'info, AncestorQuery<'info>>,
        depth: u8,
        candidate: Pubkey,
    ) -> Result<bool> {
        instructions::check_ancestor_at(ctx, depth, candidate)
    }

    pub fn initialize_tier_config(
        ctx: Context<InitializeTierConfig>,
        input: InitTierConfigInput,
    ) -> Result<()> {
        instructions::initialize_tier_config(ctx, input)
    }

    pub fn set_conditions(
        ctx: Context<UpdateTierConfig>,
        tier: u8,
        experience_threshold: u64,
        required_counts: [u32; RANK_COUNT],
    ) -> Result<()> {
        instructions::set_conditions(ctx, tier, experience_threshold, required_counts)
    }

    pub fn set_ration_limit(ctx: Context<UpdateTierConfig>, tier: u8, limit: u32) -> Result<()> {
        instructions::set_ration_limit(ctx, tier, limit)
    }

    pub fn set_xp_mint(ctx: Context<UpdateTierConfig>, xp_mint: Pubkey) -> Result<()> {
        instructions::set_xp_mint(ctx, xp_mint)
    }

    pub fn set_magistrate(ctx: Context<UpdateTierConfig>, new_magistrate: Pubkey) -> Result<()> {
        instructions::set_magistrate(ctx, new_magistrate)
    }

    pub fn initialize_fee_schedule(
        ctx: Context<InitializeFeeSchedule>,
        custodian: Pubkey,
        treasuries: Treasuries,
    ) -> Result<()> {
        instructions::initialize_fee_schedule(ctx, custodian, treasuries)
    }

    pub fn set_seeker_fees(ctx: Context<UpdateFeeSchedule>, fees: SeekerFees) -> Result<()> {
        instructions::set_seeker_fees(ctx, fees)
    }

    pub fn set_solver_fees(ctx: Context<UpdateFeeSchedule>, fees: SolverFees) -> Result<()> {
        instructions::set_solver_fees(ctx, fees)
    }

    pub fn set_party_fees(ctx: Context<UpdateFeeSchedule>, fees: PartyFees) -> Result<()> {
        instructions::set_party_fees(ctx, fees)
    }

    pub fn set_bulk_referral_rate(
        ctx: Context<UpdateFeeSchedule>,
        rates: [[u64; REFERRAL_LAYERS]; REFERRAL_TIERS],
    ) -> Result<()> {
        instructions::set_bulk_referral_rate(ctx, rates)
    }

    pub fn set_protocol_rates(
        ctx: Context<UpdateFeeSchedule>,
        dispute_deposit_rate: u64,
        referral_rewards_tax: u64,
    ) -> Result<()> {
        instructions::set_protocol_rates(ctx, dispute_deposit_rate, referral_rewards_tax)
    }

    pub fn set_referral_rewards_revenue(ctx: Context<UpdateFeeSchedule>, rate: u64) -> Result<()> {
        instructions::set_referral_rewards_revenue(ctx, rate)
    }

    pub fn set_treasury(
        ctx: Context<UpdateFeeSchedule>,
        kind: TreasuryKind,
        address: Pubkey,
    ) -> Result<()> {
        instructions::set_treasury(ctx, kind, address)
    }

    pub fn set_custodian(ctx: Context<UpdateFeeSchedule>, new_custodian: Pubkey) -> Result<()> {
        instructions::set_custodian(ctx, new_custodian)
    }
}
